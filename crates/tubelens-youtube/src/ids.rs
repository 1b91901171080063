//! Input validation for video ids, channel ids and search queries.

use crate::error::YoutubeError;

const VIDEO_ID_LEN: usize = 11;
const CHANNEL_ID_LEN: usize = 24;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Checks that `id` is an 11-character YouTube video id.
///
/// # Errors
///
/// Returns [`YoutubeError::Validation`] if the id is malformed.
pub fn validate_video_id(id: &str) -> Result<(), YoutubeError> {
    if id.len() == VIDEO_ID_LEN && id.chars().all(is_id_char) {
        Ok(())
    } else {
        Err(YoutubeError::Validation(format!(
            "'{id}' is not a valid video id (expected {VIDEO_ID_LEN} characters of [A-Za-z0-9_-])"
        )))
    }
}

/// Checks that `id` looks like a channel id: `UC` followed by 22 id characters.
///
/// # Errors
///
/// Returns [`YoutubeError::Validation`] if the id is malformed.
pub fn validate_channel_id(id: &str) -> Result<(), YoutubeError> {
    if id.len() == CHANNEL_ID_LEN && id.starts_with("UC") && id.chars().all(is_id_char) {
        Ok(())
    } else {
        Err(YoutubeError::Validation(format!(
            "'{id}' is not a valid channel id (expected 'UC' followed by 22 characters)"
        )))
    }
}

/// Rejects blank search queries.
///
/// # Errors
///
/// Returns [`YoutubeError::Validation`] if `query` is empty after trimming.
pub fn validate_query(query: &str) -> Result<(), YoutubeError> {
    if query.trim().is_empty() {
        Err(YoutubeError::Validation(
            "search query must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Accepts a bare video id or a watch/short/share URL and returns the id.
///
/// Recognised forms: `youtube.com/watch?v=ID`, `youtu.be/ID`,
/// `youtube.com/shorts/ID`, `youtube.com/embed/ID`. Trailing query strings and
/// fragments are ignored.
///
/// # Errors
///
/// Returns [`YoutubeError::Validation`] if no valid id can be extracted.
pub fn parse_video_ref(input: &str) -> Result<String, YoutubeError> {
    let trimmed = input.trim();
    if validate_video_id(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    let url = reqwest::Url::parse(trimmed).map_err(|_| {
        YoutubeError::Validation(format!("'{trimmed}' is neither a video id nor a URL"))
    })?;
    let host = url.host_str().unwrap_or_default();

    let candidate = if host.ends_with("youtu.be") {
        url.path_segments().and_then(|mut s| s.next()).map(str::to_owned)
    } else if host.ends_with("youtube.com") {
        let mut segments = url.path_segments().into_iter().flatten();
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("shorts" | "embed" | "live") => segments.next().map(str::to_owned),
            _ => None,
        }
    } else {
        None
    };

    match candidate {
        Some(id) => {
            validate_video_id(&id)?;
            Ok(id)
        }
        None => Err(YoutubeError::Validation(format!(
            "no video id found in '{trimmed}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_video_id() {
        assert!(validate_video_id("dQw4w9WgXcQ").is_ok());
        assert!(validate_video_id("a-b_c-d_e-f").is_ok());
    }

    #[test]
    fn rejects_short_or_dirty_video_id() {
        assert!(validate_video_id("abc").is_err());
        assert!(validate_video_id("dQw4w9WgXc!").is_err());
        assert!(validate_video_id("").is_err());
    }

    #[test]
    fn channel_id_requires_uc_prefix_and_length() {
        assert!(validate_channel_id("UC_x5XG1OV2P6uZZ5FSM9Ttw").is_ok());
        assert!(validate_channel_id("XX_x5XG1OV2P6uZZ5FSM9Ttw").is_err());
        assert!(validate_channel_id("UC_x5XG1OV2P6uZZ5FSM9Tt").is_err());
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(validate_query("  ").is_err());
        assert!(validate_query("rust tutorial").is_ok());
    }

    #[test]
    fn parses_video_refs_from_common_urls() {
        for input in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                parse_video_ref(input).unwrap(),
                "dQw4w9WgXcQ",
                "failed for {input}"
            );
        }
    }

    #[test]
    fn rejects_non_youtube_urls() {
        assert!(parse_video_ref("https://vimeo.com/123456789").is_err());
        assert!(parse_video_ref("https://www.youtube.com/playlist?list=PLrAXtmRdnEQy").is_err());
        assert!(parse_video_ref("not a url").is_err());
    }
}
