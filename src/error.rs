// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;

pub const MISSING_MESSAGE: &str = "No userMessage provided";
pub const RATE_LIMITED_MESSAGE: &str =
    "Sounds like you need more help. Why not contact Workhorse IT for expert support?";
pub const UPSTREAM_ERROR_FALLBACK: &str = "OpenAI returned an error";

/// Every failure a request can end in. None of them are retried.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("Missing OpenAI API Key")]
    MissingApiKey,

    #[error("{0}")]
    Upstream(String),

    #[error("No response from OpenAI")]
    NoResponse,

    #[error("transport error: {0}")]
    Transport(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::MissingApiKey
            | AppError::Upstream(_)
            | AppError::NoResponse
            | AppError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::RateLimited => ErrorResponse {
                error: RATE_LIMITED_MESSAGE.to_string(),
                show_archie: Some(true),
            },
            AppError::Transport(detail) => {
                tracing::error!(%detail, "upstream transport failure");
                ErrorResponse::new("Server error")
            }
            AppError::BadRequest(msg) | AppError::Upstream(msg) => ErrorResponse::new(msg),
            other => ErrorResponse::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
