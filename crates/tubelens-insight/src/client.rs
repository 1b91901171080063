//! HTTP client for the Anthropic Messages API.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::InsightError;
use crate::service::InsightService;
use crate::types::{ApiErrorEnvelope, Message, MessagesRequest, MessagesResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_USER_AGENT: &str = "tubelens/0.1 (channel-analytics)";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP 529: Anthropic's "overloaded" status.
const STATUS_OVERLOADED: u16 = 529;

/// Model parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 3000,
            temperature: 0.3,
        }
    }
}

/// Client for `POST /v1/messages`.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    messages_url: Url,
    settings: ModelSettings,
    timeout_secs: u64,
}

impl AnthropicClient {
    /// Creates a client pointed at the production API with default model
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Auth`] if `api_key` is blank, or
    /// [`InsightError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, InsightError> {
        Self::build(api_key, timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`AnthropicClient::new`], plus [`InsightError::InvalidConfig`]
    /// if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, InsightError> {
        Self::build(api_key, timeout_secs, DEFAULT_USER_AGENT, base_url)
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Auth`] when no Claude API key is configured,
    /// otherwise the same as [`AnthropicClient::with_base_url`].
    pub fn from_config(config: &tubelens_core::AppConfig) -> Result<Self, InsightError> {
        let api_key = config
            .claude_api_key
            .as_deref()
            .ok_or_else(|| InsightError::Auth("no Claude API key configured".to_string()))?;
        let client = Self::build(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.anthropic_base_url,
        )?;
        Ok(client.with_settings(ModelSettings {
            model: config.insight_model.clone(),
            max_tokens: config.insight_max_tokens,
            temperature: config.insight_temperature,
        }))
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn build(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, InsightError> {
        if api_key.trim().is_empty() {
            return Err(InsightError::Auth("no Claude API key configured".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let messages_url = Url::parse(&normalised)
            .and_then(|base| base.join("v1/messages"))
            .map_err(|e| InsightError::InvalidConfig(format!("base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            messages_url,
            settings: ModelSettings::default(),
            timeout_secs,
        })
    }

    /// Sends one user message and returns the concatenated text blocks of
    /// the reply.
    ///
    /// # Errors
    ///
    /// - [`InsightError::Auth`] on 401/403.
    /// - [`InsightError::RateLimited`] on 429/529.
    /// - [`InsightError::Timeout`] or [`InsightError::Http`] on transport
    ///   failure.
    /// - [`InsightError::MalformedResponse`] when the body has no text.
    pub async fn send_message(&self, prompt: &str) -> Result<String, InsightError> {
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            model = %self.settings.model,
            prompt_chars = prompt.chars().count(),
            "Anthropic messages request"
        );

        let response = self
            .client
            .post(self.messages_url.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            let err = classify_error(status, &text, retry_after_secs);
            tracing::warn!(status = status.as_u16(), error = %err, "Anthropic request failed");
            return Err(err);
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        extract_text(&text)
    }

    fn transport_error(&self, err: reqwest::Error) -> InsightError {
        if err.is_timeout() {
            InsightError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            InsightError::Http(err.without_url())
        }
    }
}

impl InsightService for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, InsightError> {
        self.send_message(prompt).await
    }
}

/// Concatenates the `text` blocks of a Messages API reply.
pub(crate) fn extract_text(body: &str) -> Result<String, InsightError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| InsightError::MalformedResponse(format!("invalid JSON body: {e}")))?;

    let mut text = String::new();
    let mut found = false;
    for block in &response.content {
        if block.kind == "text" {
            if let Some(t) = &block.text {
                text.push_str(t);
                found = true;
            }
        }
    }
    if !found {
        return Err(InsightError::MalformedResponse(
            "reply contained no text content".to_string(),
        ));
    }
    if response.stop_reason.as_deref() == Some("max_tokens") {
        tracing::warn!("Anthropic reply was cut off at max_tokens");
    }
    Ok(text)
}

/// Maps a non-2xx response to the matching [`InsightError`] variant.
pub(crate) fn classify_error(
    status: StatusCode,
    body: &str,
    retry_after_secs: Option<u64>,
) -> InsightError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|e| {
            if e.error.kind.is_empty() {
                e.error.message
            } else {
                format!("{}: {}", e.error.kind, e.error.message)
            }
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status.as_u16() {
        401 | 403 => InsightError::Auth(message),
        429 | STATUS_OVERLOADED => InsightError::RateLimited {
            message,
            retry_after_secs,
        },
        code => InsightError::UnexpectedStatus {
            status: code,
            message,
        },
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
