//! Engagement ranking: per-video like/comment ratios, an outlier guard on the
//! comment ratio, and a recency-weighted score.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tubelens_core::VideoRecord;

const EPSILON: f64 = 1e-9;

/// Weights and thresholds for [`rank_videos`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementPolicy {
    /// Comment ratios above `mean + outlier_sigma * std_dev` are excluded.
    pub outlier_sigma: f64,
    /// Multiplier on the comment ratio in the score.
    pub comment_weight: f64,
    /// Videos published within this many days of `now` count as recent.
    pub recency_window_days: i64,
    /// Score multiplier for recent videos.
    pub recency_bonus: f64,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            outlier_sigma: 2.0,
            comment_weight: 3.0,
            recency_window_days: 7,
            recency_bonus: 1.2,
        }
    }
}

/// A video with its derived engagement metrics. Ratios are percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVideo {
    pub video: VideoRecord,
    pub like_ratio: f64,
    pub comment_ratio: f64,
    pub is_recent: bool,
    pub engagement_score: f64,
}

/// Output of [`rank_videos`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Non-outlier videos, best score first.
    pub kept: Vec<RankedVideo>,
    /// Ids of videos dropped by the outlier guard, in input order.
    pub excluded_outliers: Vec<String>,
}

impl Ranking {
    /// The `n` best-scoring videos.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedVideo] {
        &self.kept[..n.min(self.kept.len())]
    }

    /// The kept records, for downstream aggregation.
    pub fn records(&self) -> impl Iterator<Item = &VideoRecord> {
        self.kept.iter().map(|r| &r.video)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Mean and population standard deviation.
#[allow(clippy::cast_precision_loss)]
fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Scores every record, drops comment-ratio outliers, and sorts the rest by
/// score descending (ties by id ascending).
///
/// Mean and deviation are taken over videos with at least one view; a video
/// with zero views has both ratios at 0 and is never an outlier.
#[must_use]
pub fn rank_videos(
    records: &[VideoRecord],
    now: DateTime<Utc>,
    policy: &EngagementPolicy,
) -> Ranking {
    let viewed: Vec<f64> = records
        .iter()
        .filter(|r| r.view_count > 0)
        .map(|r| percent(r.comment_count, r.view_count))
        .collect();
    let threshold = mean_std(&viewed).map(|(mean, std)| mean + policy.outlier_sigma * std);

    let recent_after = now - Duration::days(policy.recency_window_days);
    let mut ranking = Ranking::default();

    for record in records {
        let comment_ratio = percent(record.comment_count, record.view_count);
        if let Some(limit) = threshold {
            if record.view_count > 0 && comment_ratio > limit + EPSILON {
                ranking.excluded_outliers.push(record.id.clone());
                continue;
            }
        }

        let like_ratio = percent(record.like_count, record.view_count);
        let is_recent = record.published_at >= recent_after;
        let recency = if is_recent { policy.recency_bonus } else { 1.0 };
        ranking.kept.push(RankedVideo {
            video: record.clone(),
            like_ratio,
            comment_ratio,
            is_recent,
            engagement_score: (like_ratio + policy.comment_weight * comment_ratio) * recency,
        });
    }

    ranking.kept.sort_by(|a, b| {
        b.engagement_score
            .total_cmp(&a.engagement_score)
            .then_with(|| a.video.id.cmp(&b.video.id))
    });

    if !ranking.excluded_outliers.is_empty() {
        tracing::debug!(
            excluded = ranking.excluded_outliers.len(),
            kept = ranking.kept.len(),
            "comment-ratio outliers excluded"
        );
    }
    ranking
}
