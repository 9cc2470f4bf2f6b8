//! HTTP error responses.

use super::telemetry::increment_storage_errors;
use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub result: bool,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human readable message.
    pub msg: String,
}

/// An error that maps onto a status code and an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    msg: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }
}

impl From<leaddesk::Error> for ApiError {
    fn from(err: leaddesk::Error) -> Self {
        use leaddesk::Error;

        if err.is_validation() {
            tracing::debug!(error = %err, "rejected request");
            let (code, msg): (&str, String) = match &err {
                Error::InvalidEmail { .. } => ("INVALID_EMAIL", "Email is not a valid email".into()),
                Error::InvalidAmount { .. } => (
                    "INVALID_AMOUNT",
                    "Estimated sale amount is not a valid number".into(),
                ),
                Error::InvalidId { .. } => ("INVALID_ID", err.to_string()),
                _ => ("INVALID_REQUEST", err.to_string()),
            };
            return Self::new(StatusCode::BAD_REQUEST, code, msg);
        }

        match err {
            Error::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
            Error::Conflict { .. } => Self::new(StatusCode::CONFLICT, "CONFLICT", err.to_string()),
            err => {
                tracing::error!(error = %err, "storage failure");
                increment_storage_errors();
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_UNAVAILABLE",
                    "There was a server error.",
                )
            }
        }
    }
}

impl ApiError {
    fn rejected_body(status: StatusCode, body_text: String) -> Self {
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", body_text)
            }
            _ => Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", body_text),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected_body(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::rejected_body(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            result: false,
            code: self.code,
            msg: self.msg,
        };
        (self.status, Json(body)).into_response()
    }
}
