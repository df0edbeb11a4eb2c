use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable code for malformed or schema-violating request bodies.
pub const BAD_REQUEST: &str = "BAD_REQUEST";

/// Machine-readable code for failures nobody mapped to something better.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

const BAD_REQUEST_MESSAGE: &str = "Malformed request or invalid JSON.";
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Body of every error response: `{"code": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request ({code}): {message}")]
    BadRequest { code: &'static str, message: String },

    /// Server-side failure with a caller-facing code and a fixed message.
    /// The source is never serialized; whoever builds this variant logs it.
    #[error("Internal error ({code}): {source}")]
    Internal {
        code: &'static str,
        message: &'static str,
        source: anyhow::Error,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn internal(code: &'static str, message: &'static str, source: anyhow::Error) -> Self {
        AppError::Internal {
            code,
            message,
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } | AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "Rejected request body"
        );
        AppError::bad_request(BAD_REQUEST, BAD_REQUEST_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::Internal { code, message, .. } => (code, message.to_string()),
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Unhandled internal error");
                (INTERNAL_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error while serving request");
                (INTERNAL_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
