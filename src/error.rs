//! Error taxonomy for the CMS service.
//!
//! Auth failures are values the caller renders, role-fetch failures never leave this
//! crate (they degrade to `Role::User`), and CRUD failures abort the request with the
//! stored state untouched.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx. Row-level security denials surface here too.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped onto the domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (duplicate slug, duplicate settings key).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Simulated outage from the in-memory repository.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the external auth provider.
///
/// Bad credentials and duplicate accounts are expected outcomes: callers get them back
/// as values and show the message inline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("user already registered")]
    UserAlreadyExists,

    #[error("{0}")]
    Rejected(String),

    #[error("session expired")]
    SessionExpired,

    #[error("auth service unreachable: {0}")]
    Transport(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Database(err) => {
                tracing::error!(error = %err, "Repository operation failed");
                // Don't expose database details to clients.
                let status = match err {
                    RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err {
                    RepositoryError::Conflict(detail) => detail,
                    _ => "Operation failed".to_string(),
                };
                (status, Json(json!({ "error": message }))).into_response()
            }
            Self::Auth(err) => err.into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
