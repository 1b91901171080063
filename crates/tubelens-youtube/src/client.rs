//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with API key management, typed response deserialization,
//! and translation of Google's error envelope into [`YoutubeError`] variants.
//! The client never retries; quota and auth failures go straight back to the
//! caller.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::types::{
    ApiErrorEnvelope, ChannelListResponse, SearchListResponse, VideoItem, VideoListResponse,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_USER_AGENT: &str = "tubelens/0.1 (channel-analytics)";

/// `search.list` and `videos.list` both cap `maxResults`/`id` at 50.
pub(crate) const MAX_PAGE_SIZE: usize = 50;

/// Error reasons Google reports when a quota or rate limit is hit.
const RATE_LIMIT_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
];

/// Error reasons that mean the key itself is unusable.
const AUTH_REASONS: &[&str] = &[
    "keyInvalid",
    "keyExpired",
    "forbidden",
    "accessNotConfigured",
    "ipRefererBlocked",
];

/// Parameters for one `search.list` page.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchRequest<'a> {
    /// Free-text query (`q`).
    pub query: Option<&'a str>,
    /// Restrict to one channel (`channelId`); results are ordered by date.
    pub channel_id: Option<&'a str>,
    pub published_after: Option<DateTime<Utc>>,
    pub page_size: usize,
    pub page_token: Option<&'a str>,
}

/// One page of `search.list` results reduced to video ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Client for the YouTube Data API v3.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    timeout_secs: u64,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Auth`] if `api_key` is blank, or
    /// [`YoutubeError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::build(api_key, timeout_secs, DEFAULT_USER_AGENT, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::new`], plus [`YoutubeError::Validation`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        Self::build(api_key, timeout_secs, DEFAULT_USER_AGENT, base_url)
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::with_base_url`].
    pub fn from_config(config: &tubelens_core::AppConfig) -> Result<Self, YoutubeError> {
        Self::build(
            &config.youtube_api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.youtube_base_url,
        )
    }

    fn build(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        if api_key.trim().is_empty() {
            return Err(YoutubeError::Auth("no YouTube API key configured".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            YoutubeError::Validation(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            timeout_secs,
        })
    }

    /// Fetches one page of video ids from `search.list`.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::Auth`] / [`YoutubeError::RateLimited`] from the API.
    /// - [`YoutubeError::Timeout`] or [`YoutubeError::Http`] on transport failure.
    /// - [`YoutubeError::Deserialize`] if the body does not match.
    pub async fn search_page(
        &self,
        request: &SearchRequest<'_>,
    ) -> Result<SearchPage, YoutubeError> {
        let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let published_after = request
            .published_after
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));

        let mut params: Vec<(&str, &str)> = vec![
            ("part", "id"),
            ("type", "video"),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(q) = request.query {
            params.push(("q", q));
        }
        if let Some(channel_id) = request.channel_id {
            params.push(("channelId", channel_id));
            params.push(("order", "date"));
        }
        if let Some(after) = published_after.as_deref() {
            params.push(("publishedAfter", after));
        }
        if let Some(token) = request.page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("search", &params)?;
        let response: SearchListResponse = self.request_json("search", &url).await?;

        Ok(SearchPage {
            video_ids: response
                .items
                .into_iter()
                .filter_map(|item| item.id.video_id)
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Fetches snippet, statistics and content details for the given ids.
    ///
    /// Ids are sent in batches of 50. Ids unknown to YouTube are simply
    /// absent from the result; callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::search_page`].
    pub async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>, YoutubeError> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let joined = chunk.join(",");
            let url = self.build_url(
                "videos",
                &[("part", "snippet,statistics,contentDetails"), ("id", joined.as_str())],
            )?;
            let response: VideoListResponse = self.request_json("videos", &url).await?;
            items.extend(response.items);
        }
        Ok(items)
    }

    /// Returns whether `channels.list` knows the channel id.
    ///
    /// # Errors
    ///
    /// Same as [`YoutubeClient::search_page`].
    pub async fn channel_exists(&self, channel_id: &str) -> Result<bool, YoutubeError> {
        let url = self.build_url("channels", &[("part", "id"), ("id", channel_id)])?;
        let response: ChannelListResponse = self.request_json("channels", &url).await?;
        Ok(response.items.iter().any(|c| c.id == channel_id))
    }

    /// Builds an endpoint URL with the API key and percent-encoded parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self.base_url.join(endpoint).map_err(|e| {
            YoutubeError::Validation(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request and deserializes a 2xx body, or classifies the
    /// failure. `endpoint` is used as error context so the API key in the URL
    /// never ends up in an error message.
    async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &Url,
    ) -> Result<T, YoutubeError> {
        tracing::debug!(endpoint, "YouTube API request");

        let response = self
            .client
            .get(url.clone())
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
            let body = response.text().await.unwrap_or_default();
            let err = classify_error(status, endpoint, &body, retry_after_secs);
            tracing::warn!(
                endpoint,
                status = status.as_u16(),
                error = %err,
                "YouTube API request failed"
            );
            return Err(err);
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: format!("{endpoint}.list response"),
            source: e,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> YoutubeError {
        if err.is_timeout() {
            YoutubeError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            YoutubeError::Http(err.without_url())
        }
    }
}

/// Maps a non-2xx response to the matching [`YoutubeError`] variant.
///
/// Google reports most key and quota problems as 400/403 with a `reason` in
/// the error envelope, so the reason takes precedence over the status code.
pub(crate) fn classify_error(
    status: StatusCode,
    endpoint: &str,
    body: &str,
    retry_after_secs: Option<u64>,
) -> YoutubeError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    let reason = envelope
        .as_ref()
        .and_then(|e| e.error.errors.first())
        .map(|d| d.reason.clone())
        .unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS || RATE_LIMIT_REASONS.contains(&reason.as_str()) {
        let reason = if reason.is_empty() { message } else { reason };
        return YoutubeError::RateLimited {
            reason,
            retry_after_secs,
        };
    }

    let key_rejected = AUTH_REASONS.contains(&reason.as_str()) || message.contains("API key");
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status == StatusCode::BAD_REQUEST && key_rejected)
    {
        return YoutubeError::Auth(message);
    }

    if status == StatusCode::NOT_FOUND {
        return YoutubeError::NotFound {
            kind: "resource",
            id: message,
        };
    }

    YoutubeError::UnexpectedStatus {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        message,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
