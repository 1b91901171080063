//! Time-bucketed performance aggregation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;
use tubelens_core::VideoRecord;

/// How publish timestamps are discretized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucketing {
    /// Hour of day, 0–23.
    HourOfDay,
    /// ISO weekday, Monday = 1 … Sunday = 7.
    DayOfWeek,
    /// Calendar date.
    Day,
    /// Calendar month.
    Month,
}

impl Bucketing {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Bucketing::HourOfDay => "hour of day",
            Bucketing::DayOfWeek => "day of week",
            Bucketing::Day => "day",
            Bucketing::Month => "month",
        }
    }
}

/// A discretized time key. Keys of one [`Bucketing`] sort chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Hour(u32),
    Weekday(u32),
    Date(NaiveDate),
    Month { year: i32, month: u32 },
}

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Hour(h) => write!(f, "{h:02}:00"),
            BucketKey::Weekday(d) => {
                let name = usize::try_from(*d)
                    .ok()
                    .and_then(|d| d.checked_sub(1))
                    .and_then(|i| WEEKDAY_NAMES.get(i))
                    .copied()
                    .unwrap_or("?");
                f.write_str(name)
            }
            BucketKey::Date(date) => write!(f, "{date}"),
            BucketKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

/// Sum and mean of one numeric field within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricSummary {
    pub sum: u64,
    pub mean: f64,
}

/// Aggregate metrics for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BucketStats {
    pub count: usize,
    pub views: MetricSummary,
    pub likes: MetricSummary,
    pub comments: MetricSummary,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    views: u64,
    likes: u64,
    comments: u64,
}

impl Accumulator {
    fn add(&mut self, record: &VideoRecord) {
        self.count += 1;
        self.views = self.views.saturating_add(record.view_count);
        self.likes = self.likes.saturating_add(record.like_count);
        self.comments = self.comments.saturating_add(record.comment_count);
    }

    fn finish(&self) -> BucketStats {
        BucketStats {
            count: self.count,
            views: summarize(self.views, self.count),
            likes: summarize(self.likes, self.count),
            comments: summarize(self.comments, self.count),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize(sum: u64, count: usize) -> MetricSummary {
    let mean = if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    };
    MetricSummary { sum, mean }
}

/// Groups records by `key_fn` and computes per-bucket metrics.
///
/// Every record lands in exactly one bucket, so the bucket counts sum to the
/// number of input records. Empty input yields an empty map.
pub fn aggregate_by<'a, I, K, F>(records: I, key_fn: F) -> BTreeMap<K, BucketStats>
where
    I: IntoIterator<Item = &'a VideoRecord>,
    K: Ord,
    F: Fn(&VideoRecord) -> K,
{
    let mut acc: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        acc.entry(key_fn(record)).or_default().add(record);
    }
    acc.into_iter().map(|(k, a)| (k, a.finish())).collect()
}

/// Computes the bucket key of `published_at` after shifting it to `offset`.
#[must_use]
pub fn bucket_key(
    bucketing: Bucketing,
    published_at: DateTime<Utc>,
    offset: FixedOffset,
) -> BucketKey {
    let local = published_at.with_timezone(&offset);
    match bucketing {
        Bucketing::HourOfDay => BucketKey::Hour(local.hour()),
        Bucketing::DayOfWeek => BucketKey::Weekday(local.weekday().number_from_monday()),
        Bucketing::Day => BucketKey::Date(local.date_naive()),
        Bucketing::Month => BucketKey::Month {
            year: local.year(),
            month: local.month(),
        },
    }
}

/// Aggregates records by one of the named bucketings.
pub fn aggregate<'a, I>(
    records: I,
    bucketing: Bucketing,
    offset: FixedOffset,
) -> BTreeMap<BucketKey, BucketStats>
where
    I: IntoIterator<Item = &'a VideoRecord>,
{
    aggregate_by(records, |r| bucket_key(bucketing, r.published_at, offset))
}

/// All 24 hours in order, with empty hours zero-filled.
///
/// Keys that are not [`BucketKey::Hour`] are ignored.
#[must_use]
pub fn dense_hours(buckets: &BTreeMap<BucketKey, BucketStats>) -> Vec<(BucketKey, BucketStats)> {
    (0..24)
        .map(BucketKey::Hour)
        .map(|k| (k, buckets.get(&k).copied().unwrap_or_default()))
        .collect()
}

/// All seven weekdays Monday→Sunday, with empty days zero-filled.
#[must_use]
pub fn dense_weekdays(
    buckets: &BTreeMap<BucketKey, BucketStats>,
) -> Vec<(BucketKey, BucketStats)> {
    (1..=7)
        .map(BucketKey::Weekday)
        .map(|k| (k, buckets.get(&k).copied().unwrap_or_default()))
        .collect()
}

/// Headline numbers across the whole record set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Overview {
    pub video_count: usize,
    pub total_views: u64,
    pub mean_views: f64,
    pub mean_likes: f64,
    pub mean_comments: f64,
}

pub fn overview<'a, I>(records: I) -> Overview
where
    I: IntoIterator<Item = &'a VideoRecord>,
{
    let mut acc = Accumulator::default();
    for record in records {
        acc.add(record);
    }
    let stats = acc.finish();
    Overview {
        video_count: stats.count,
        total_views: stats.views.sum,
        mean_views: stats.views.mean,
        mean_likes: stats.likes.mean,
        mean_comments: stats.comments.mean,
    }
}
