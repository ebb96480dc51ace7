use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum CadenceError {
    /// A stored rule or date failed to parse as a calendar day. Surfaced as a
    /// data-integrity failure; the engine does not guess and does not drop
    /// the offending rule.
    #[error("stored calendar data is invalid: {0}")]
    DataIntegrity(String),

    #[error("invalid request argument: {0}")]
    InvalidArgument(String),

    /// The conditional commit found the streak record changed between load
    /// and write. The processor retries the invocation once before this
    /// reaches a caller.
    #[error("streak record {0} changed between load and commit")]
    CommitConflict(i64),

    #[error("group {0} has not opted in to streak tracking")]
    UntrackedGroup(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for CadenceError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CadenceError::DataIntegrity(_) => {
                let body = ApiErrorObject {
                    code: "DATA_INTEGRITY".to_string(),
                    message: "Stored calendar data could not be interpreted.".to_string(),
                    details: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }

            CadenceError::InvalidArgument(message) => {
                let body = ApiErrorObject {
                    code: "INVALID_ARGUMENT".to_string(),
                    message,
                    details: None,
                };
                (StatusCode::BAD_REQUEST, body)
            }

            CadenceError::CommitConflict(_) => {
                let body = ApiErrorObject {
                    code: "CONFLICT".to_string(),
                    message: "The streak record changed concurrently; try again.".to_string(),
                    details: None,
                };
                (StatusCode::CONFLICT, body)
            }

            CadenceError::UntrackedGroup(group) => {
                let body = ApiErrorObject {
                    code: "GROUP_NOT_TRACKED".to_string(),
                    message: format!("Group {group} has not opted in to streak tracking."),
                    details: None,
                };
                (StatusCode::CONFLICT, body)
            }

            CadenceError::NotFound(what) => {
                let body = ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                    details: None,
                };
                (StatusCode::NOT_FOUND, body)
            }

            CadenceError::RactorError(_) | CadenceError::DatabaseError(_) => {
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

impl IsRetryable for CadenceError {
    fn is_retryable(&self) -> bool {
        matches!(self, CadenceError::CommitConflict(_))
    }
}
