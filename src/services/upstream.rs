// src/services/upstream.rs
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::Config,
    error::{AppError, UPSTREAM_ERROR_FALLBACK},
};

/// Something that turns one user message into one reply.
#[async_trait]
pub trait ChatCompletion: Send + Sync + Debug {
    async fn complete(&self, message: &str) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<CompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CompletionMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

// null, false, 0 and "" count as absent.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Classify an upstream payload: error first, then `choices[0].message.content`.
/// Anything else, whatever its shape, is `NoResponse`.
pub fn classify_completion(data: &Value) -> Result<String, AppError> {
    if let Some(err) = data.get("error").filter(|e| is_set(e)) {
        let msg = err
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(UPSTREAM_ERROR_FALLBACK)
            .to_string();
        return Err(AppError::Upstream(msg));
    }

    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AppError::NoResponse)
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    url: String,
    model: String,
}

impl Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            url: url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self::new(
            client,
            config.openai_api_key.clone(),
            config.upstream_url.clone(),
            config.model.clone(),
        ))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, message: &str) -> Result<String, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("OPENAI_API_KEY is not set");
            return Err(AppError::MissingApiKey);
        };

        let body = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage { role: "user", content: message }],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await?;
        tracing::debug!(%status, payload = %data, "OpenAI raw response");

        classify_completion(&data).inspect_err(|e| {
            if let AppError::Upstream(msg) = e {
                tracing::warn!(error = %msg, "OpenAI returned an error");
            }
        })
    }
}
