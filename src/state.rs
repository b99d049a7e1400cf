// src/state.rs
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::services::rate_limiter::RateLimiter;
use crate::services::static_answers::StaticAnswers;
use crate::services::upstream::{ChatCompletion, OpenAiClient};

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub static_answers: StaticAnswers,
    pub upstream: Arc<dyn ChatCompletion>,
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(
        rate_limiter: RateLimiter,
        static_answers: StaticAnswers,
        upstream: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self {
            rate_limiter,
            static_answers,
            upstream,
            trust_proxy: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let static_answers = match &config.static_answers_path {
            Some(path) => StaticAnswers::load_with_file(path)?,
            None => StaticAnswers::default(),
        };
        let upstream = OpenAiClient::from_config(config).context("failed to build HTTP client")?;

        Ok(Self {
            rate_limiter: RateLimiter::new(config.rate_limit.clone()),
            static_answers,
            upstream: Arc::new(upstream),
            trust_proxy: config.trust_proxy,
        })
    }
}
