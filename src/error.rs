/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error envelope)
 * - validation error / framework rejection / unexpected fault を統一的に変換
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::PassThrough;
use crate::validation::ValidationFailure;

/// Message used for every unclassified server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// The only body shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// Status is left to the caller: `(StatusCode::CONFLICT, envelope).into_response()`.
impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let mut res = Json(self).into_response();
        res.extensions_mut().insert(PassThrough);
        res
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    /// Request refused by the framework (unreadable body, bad query string...).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal error")]
    Internal,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(failure) => failure.status(),
            AppError::Rejected { status, .. } => *status,
            AppError::Internal | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Validation(failure) => {
                if status.is_server_error() {
                    tracing::error!(violations = ?failure.violations(), "return value violates its constraints");
                } else {
                    tracing::debug!(violations = ?failure.violations(), "request failed validation");
                }
                failure.message()
            }
            AppError::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            AppError::Unexpected(err) => {
                // Logged in full here; the caller only gets the generic message.
                tracing::error!(error = ?err, "unhandled failure");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let mut res = (status, ErrorEnvelope::new(message)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        res
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::rejected(rejection.status(), rejection.body_text())
    }
}
