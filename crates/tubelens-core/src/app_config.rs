#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub youtube_api_key: String,
    pub youtube_base_url: String,
    /// Insight generation is skipped when no key is configured.
    pub claude_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub insight_model: String,
    pub insight_max_tokens: u32,
    pub insight_temperature: f32,
    pub insight_max_prompt_chars: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Offset from UTC applied before bucketing publish times.
    pub utc_offset_minutes: i32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("youtube_api_key", &"[redacted]")
            .field("youtube_base_url", &self.youtube_base_url)
            .field(
                "claude_api_key",
                &self.claude_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("insight_model", &self.insight_model)
            .field("insight_max_tokens", &self.insight_max_tokens)
            .field("insight_temperature", &self.insight_temperature)
            .field("insight_max_prompt_chars", &self.insight_max_prompt_chars)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}
