use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Interview feedback is outstanding; the requested transition is blocked
    /// and no state was changed.
    #[error("Precondition failed: {reason}")]
    PreconditionFailed {
        reason: String,
        offending_interviews: Vec<Uuid>,
    },

    /// A pending hire approval request already exists for the application.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        pending_request_id: Uuid,
        requested_at: DateTime<Utc>,
    },

    /// Approve/reject was invoked on a request that already left the pending
    /// state. Not a no-op: side effects must never apply twice.
    #[error("Request already processed: {0}")]
    AlreadyProcessed(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            Error::PermissionDenied(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::PreconditionFailed {
                reason,
                offending_interviews,
            } => (
                StatusCode::PRECONDITION_FAILED,
                json!({
                    "error": reason,
                    "offending_interviews": offending_interviews,
                }),
            ),
            Error::Conflict {
                message,
                pending_request_id,
                requested_at,
            } => (
                StatusCode::CONFLICT,
                json!({
                    "error": message,
                    "already_pending": true,
                    "pending_request_id": pending_request_id,
                    "requested_at": requested_at,
                }),
            ),
            Error::AlreadyProcessed(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "storage failure" }),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(%msg, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
