//! Video domain types shared by the fetcher, the analytics passes, and the
//! insight prompt builder.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Per-video statistics as returned by the fetcher.
///
/// Records are never mutated after normalization; downstream passes borrow
/// them and derive their own structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Length in seconds, when the API reported a parseable duration.
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoTarget {
    /// Free-text keyword search across all of YouTube.
    Search(String),
    /// Recent uploads of one channel (`UC…` id).
    Channel(String),
    /// An explicit list of video ids.
    Videos(Vec<String>),
}

impl VideoTarget {
    /// Short label used in logs and report headers.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            VideoTarget::Search(query) => format!("search \"{query}\""),
            VideoTarget::Channel(id) => format!("channel {id}"),
            VideoTarget::Videos(ids) => format!("{} video id(s)", ids.len()),
        }
    }
}

/// Options that bound a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound on the number of records returned for search/channel
    /// targets. Ignored for explicit id lists.
    pub max_results: usize,
    /// Only consider videos published after this instant.
    pub published_after: Option<DateTime<Utc>>,
    /// Search/channel results below this view count are dropped.
    pub min_views: u64,
}

impl FetchOptions {
    /// Builds options covering the last `months` months, counting a month as
    /// 30 days.
    #[must_use]
    pub fn recent_months(
        now: DateTime<Utc>,
        months: u32,
        max_results: usize,
        min_views: u64,
    ) -> Self {
        Self {
            max_results,
            published_after: Some(now - Duration::days(30 * i64::from(months))),
            min_views,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            published_after: None,
            min_views: 1_000,
        }
    }
}
