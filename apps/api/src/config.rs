use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::gemini::GeminiSettings;
use crate::llm_client::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// `Debug` never prints the API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiSettings,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let retry = RetryPolicy {
            max_attempts: parse_or(&var, "LLM_MAX_ATTEMPTS", 5u32)?.max(1),
            base_delay: Duration::from_millis(parse_or(&var, "LLM_BASE_DELAY_MS", 1000u64)?),
            max_delay: Duration::from_millis(parse_or(&var, "LLM_MAX_DELAY_MS", 16_000u64)?),
        };

        Ok(Config {
            gemini: GeminiSettings {
                api_key: var("GEMINI_API_KEY"),
                base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                analysis_model: var("GEMINI_ANALYSIS_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
                chat_model: var("GEMINI_CHAT_MODEL")
                    .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                retry,
            },
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_or(&var, "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
