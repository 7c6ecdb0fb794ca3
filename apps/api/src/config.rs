use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Generate requests allowed per client per window.
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Extracted PDF text is truncated to this many characters.
    pub max_resume_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 10)?,
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 3600)?,
            max_resume_chars: parse_env("MAX_RESUME_CHARS", 10_000)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_override() {
        assert_eq!(parse_env::<u32>("TAILOR_TEST_UNSET_LIMIT", 10).unwrap(), 10);

        std::env::set_var("TAILOR_TEST_WINDOW", " 120 ");
        assert_eq!(parse_env::<u64>("TAILOR_TEST_WINDOW", 3600).unwrap(), 120);

        std::env::set_var("TAILOR_TEST_PORT", "eighty");
        assert!(parse_env::<u16>("TAILOR_TEST_PORT", 8080).is_err());
    }
}
