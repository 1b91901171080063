//! Pure analytics passes over fetched video records.
//!
//! Time-bucketed performance aggregation, keyword frequency counting and
//! engagement ranking. Nothing here performs I/O; every function returns the
//! same output for the same input.

pub mod aggregate;
pub mod engagement;
pub mod keywords;

pub use aggregate::{
    aggregate, aggregate_by, bucket_key, dense_hours, dense_weekdays, overview, BucketKey,
    BucketStats, Bucketing, MetricSummary, Overview,
};
pub use engagement::{rank_videos, EngagementPolicy, RankedVideo, Ranking};
pub use keywords::{
    extract_keywords, texts_for, tokenize, KeywordCount, KeywordFrequency, KeywordSource,
    Stopwords, TokenPolicy,
};
