use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::{AppError, MISSING_MESSAGE},
    message::{ChatRequest, ChatResponse},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable chat request body");
            ChatRequest::default()
        }
    };

    let message = request
        .user_message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_MESSAGE.to_string()))?;

    if let Some(answer) = state.static_answers.lookup(&message) {
        tracing::debug!("static answer hit");
        return Ok(Json(ChatResponse { reply: answer.to_string() }));
    }

    let reply = state.upstream.complete(&message).await?;
    Ok(Json(ChatResponse { reply }))
}
