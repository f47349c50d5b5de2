use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm: LlmSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Provider-facing settings handed to `LlmClient::new`.
///
/// The API key is optional here: a missing key only fails the individual
/// completion call, not process startup.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub app_url: String,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            max_retries: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm = LlmSettings {
            api_key: optional_env("OPENROUTER_API_KEY"),
            base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            app_url: optional_env("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            max_retries: optional_env("LLM_MAX_RETRIES")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("LLM_MAX_RETRIES must be a non-negative integer")?
                .unwrap_or(0),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_llm_settings() {
        let settings = LlmSettings::default();
        assert!(settings.api_key.is_none());
        assert_eq!(settings.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(settings.model, "anthropic/claude-sonnet-4");
        assert_eq!(settings.max_retries, 0);
    }
}
