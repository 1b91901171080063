use thiserror::Error;

/// Errors returned by the YouTube Data API client and fetcher.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Missing, invalid or unauthorized API key.
    #[error("YouTube authentication failed: {0}")]
    Auth(String),

    /// The requested channel or video does not exist.
    #[error("YouTube {kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Quota exhausted or request rate too high.
    #[error("YouTube rate limit reached ({reason}){}", retry_hint(*.retry_after_secs))]
    RateLimited {
        reason: String,
        retry_after_secs: Option<u64>,
    },

    /// Caller input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The request did not complete within the configured timeout.
    #[error("YouTube request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {endpoint}: {message}")]
    UnexpectedStatus {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not normalize video {video_id}: {reason}")]
    Normalization { video_id: String, reason: String },
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(", retry after {secs}s"))
        .unwrap_or_default()
}
