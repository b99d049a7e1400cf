// src/config.rs
use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Quota settings for `/chatgpt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Tracked identifiers before expired counters get purged.
    pub max_tracked: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
            max_tracked: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub upstream_url: String,
    pub model: String,
    pub upstream_timeout: Duration,
    pub static_answers_path: Option<PathBuf>,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            openai_api_key: None,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            static_answers_path: None,
            trust_proxy: false,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid PORT: {raw}"))?,
            None => defaults.port,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid UPSTREAM_TIMEOUT_SECS: {raw}"))?,
            ),
            None => defaults.upstream_timeout,
        };

        let trust_proxy = get("TRUST_PROXY")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            openai_api_key: get("OPENAI_API_KEY"),
            upstream_url: get("OPENAI_API_URL").unwrap_or(defaults.upstream_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            upstream_timeout,
            static_answers_path: get("STATIC_ANSWERS_PATH").map(PathBuf::from),
            trust_proxy,
            rate_limit: defaults.rate_limit,
        })
    }
}
