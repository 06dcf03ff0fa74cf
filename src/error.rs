use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced to API callers. Each variant maps to one status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    /// `context` is what the client sees; `cause` is only logged.
    #[error("{context}")]
    Internal { context: String, cause: anyhow::Error },
}

impl AppError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        AppError::Unauthenticated(msg.into())
    }

    pub fn not_found() -> Self {
        AppError::NotFound("Announcement not found".into())
    }

    pub fn internal(context: impl Into<String>, cause: anyhow::Error) -> Self {
        AppError::Internal {
            context: context.into(),
            cause,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { context, cause } = &self {
            tracing::error!("{context}: {cause:#}");
        }
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Lets store calls use `?` and still carry a client-facing message.
pub trait ResultExt<T> {
    fn or_internal(self, context: &str) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for anyhow::Result<T> {
    fn or_internal(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::internal(context, e))
    }
}
