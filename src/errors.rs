use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Application error type. The taxonomy is deliberately flat: an empty
/// prompt is the only client error (400), everything else is reported as
/// a 500 carrying the error's text.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Chat session not found")]
    SessionNotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Language model error: {0}")]
    Gateway(String),

    #[error("Failed to parse JSON from the language model: {0}")]
    StructuredReply(String),

    #[error("Failed to render document: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmptyPrompt => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
