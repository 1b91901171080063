use thiserror::Error;

/// Errors returned by the insight requester.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The API key is missing or was rejected.
    #[error("Anthropic authentication failed: {0}")]
    Auth(String),

    /// Rate limited (429) or the service is overloaded (529).
    #[error("Anthropic rate limit reached ({message}){}", retry_hint(*.retry_after_secs))]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// The response body was not a Messages API reply with text content.
    #[error("malformed Anthropic response: {0}")]
    MalformedResponse(String),

    #[error("Anthropic request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from Anthropic: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The fixed part of the prompt alone exceeds the size budget.
    #[error("prompt needs {chars} chars but the budget is {max_chars}")]
    PromptTooLarge { chars: usize, max_chars: usize },

    /// Client construction rejected its settings (bad base URL).
    #[error("invalid insight client configuration: {0}")]
    InvalidConfig(String),
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(", retry after {secs}s"))
        .unwrap_or_default()
}
