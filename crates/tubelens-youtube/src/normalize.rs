//! Normalization of YouTube API items into [`VideoRecord`]s.

use chrono::{DateTime, Utc};
use tubelens_core::VideoRecord;

use crate::error::YoutubeError;
use crate::types::{VideoItem, VideoStatistics};

/// Converts a `videos.list` item into a [`VideoRecord`].
///
/// Missing statistics count as zero. The publish timestamp must be valid
/// RFC 3339; an unparseable duration is recorded as `None`.
///
/// # Errors
///
/// Returns [`YoutubeError::Normalization`] if the timestamp or a count string
/// cannot be parsed.
pub fn normalize_video(item: &VideoItem) -> Result<VideoRecord, YoutubeError> {
    let fail = |reason: String| YoutubeError::Normalization {
        video_id: item.id.clone(),
        reason,
    };

    let published_at = DateTime::parse_from_rfc3339(&item.snippet.published_at)
        .map_err(|e| fail(format!("publishedAt '{}': {e}", item.snippet.published_at)))?
        .with_timezone(&Utc);

    let default_stats = VideoStatistics::default();
    let stats = item.statistics.as_ref().unwrap_or(&default_stats);

    let view_count = parse_count(stats.view_count.as_deref())
        .map_err(|r| fail(format!("viewCount {r}")))?;
    let like_count = parse_count(stats.like_count.as_deref())
        .map_err(|r| fail(format!("likeCount {r}")))?;
    let comment_count = parse_count(stats.comment_count.as_deref())
        .map_err(|r| fail(format!("commentCount {r}")))?;

    let duration_secs = item
        .content_details
        .as_ref()
        .and_then(|d| d.duration.as_deref())
        .and_then(parse_iso8601_duration);

    Ok(VideoRecord {
        id: item.id.clone(),
        title: item.snippet.title.clone(),
        description: item.snippet.description.clone(),
        channel_title: item.snippet.channel_title.clone(),
        published_at,
        view_count,
        like_count,
        comment_count,
        tags: item.snippet.tags.clone(),
        duration_secs,
    })
}

fn parse_count(raw: Option<&str>) -> Result<u64, String> {
    match raw {
        None => Ok(0),
        Some(s) => s.trim().parse::<u64>().map_err(|e| format!("'{s}': {e}")),
    }
}

/// Parses an ISO 8601 duration such as `PT1H2M3S` or `P1DT30M` into seconds.
///
/// Only day, hour, minute and second designators are accepted (YouTube never
/// reports years, months or weeks for video lengths). Fractional seconds are
/// truncated. Returns `None` for anything else.
#[must_use]
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' if !in_time && number.is_empty() => in_time = true,
            '0'..='9' | '.' => number.push(c),
            designator => {
                if number.is_empty() {
                    return None;
                }
                let whole = number.split('.').next()?.parse::<u64>().ok()?;
                let unit = match (designator, in_time) {
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                total = total.checked_add(whole.checked_mul(unit)?)?;
                number.clear();
                saw_component = true;
            }
        }
    }

    (number.is_empty() && saw_component).then_some(total)
}
