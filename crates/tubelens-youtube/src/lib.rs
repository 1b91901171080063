//! YouTube Data API v3 client and the video fetcher built on it.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod ids;
pub mod normalize;
pub mod types;

pub use client::{SearchPage, SearchRequest, YoutubeClient};
pub use error::YoutubeError;
pub use fetcher::VideoSource;
pub use ids::{parse_video_ref, validate_channel_id, validate_query, validate_video_id};
pub use normalize::{normalize_video, parse_iso8601_duration};
