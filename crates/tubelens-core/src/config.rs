use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_INSIGHT_MODEL: &str = "claude-3-haiku-20240307";
const DEFAULT_USER_AGENT: &str = "tubelens/0.1 (channel-analytics)";

/// Largest real-world UTC offset (+14:00) in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let youtube_api_key = require("YOUTUBE_API_KEY")?;
    let claude_api_key = optional("CLAUDE_API_KEY");

    let env = parse_environment(&or_default("TUBELENS_ENV", "development"))?;
    let log_level = or_default("TUBELENS_LOG_LEVEL", "info");

    let youtube_base_url = or_default("TUBELENS_YOUTUBE_BASE_URL", DEFAULT_YOUTUBE_BASE_URL);
    let anthropic_base_url = or_default("TUBELENS_ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL);
    let insight_model = or_default("TUBELENS_INSIGHT_MODEL", DEFAULT_INSIGHT_MODEL);
    let insight_max_tokens = parse_u32("TUBELENS_INSIGHT_MAX_TOKENS", "3000")?;

    let temperature_var = "TUBELENS_INSIGHT_TEMPERATURE";
    let insight_temperature = or_default(temperature_var, "0.3")
        .parse::<f32>()
        .map_err(|e| invalid(temperature_var, e.to_string()))?;
    if !(0.0..=1.0).contains(&insight_temperature) {
        return Err(invalid(
            temperature_var,
            format!("{insight_temperature} is outside 0.0..=1.0"),
        ));
    }

    let insight_max_prompt_chars = parse_usize("TUBELENS_INSIGHT_MAX_PROMPT_CHARS", "12000")?;
    if insight_max_prompt_chars == 0 {
        return Err(invalid(
            "TUBELENS_INSIGHT_MAX_PROMPT_CHARS",
            "must be greater than zero".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("TUBELENS_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "TUBELENS_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("TUBELENS_USER_AGENT", DEFAULT_USER_AGENT);

    let offset_var = "TUBELENS_UTC_OFFSET_MINUTES";
    let utc_offset_minutes = or_default(offset_var, "0")
        .parse::<i32>()
        .map_err(|e| invalid(offset_var, e.to_string()))?;
    if utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(invalid(
            offset_var,
            format!("{utc_offset_minutes} exceeds ±{MAX_UTC_OFFSET_MINUTES} minutes"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        youtube_api_key,
        youtube_base_url,
        claude_api_key,
        anthropic_base_url,
        insight_model,
        insight_max_tokens,
        insight_temperature,
        insight_max_prompt_chars,
        request_timeout_secs,
        user_agent,
        utc_offset_minutes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TUBELENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
