//! Request-level errors and their HTTP mapping.
//!
//! Every failure renders as `{"code": ..., "message": ...}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::accounts::AccountError;
use crate::medicine::MedicineError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("{code}: {message}")]
    Rejected { code: &'static str, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Rejected { code, message } => {
                (StatusCode::BAD_REQUEST, code, message.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::Unprocessable(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<MedicineError> for ApiError {
    fn from(err: MedicineError) -> Self {
        match err {
            MedicineError::InvalidScheduleFormat { message } => ApiError::Rejected {
                code: "INVALID_SCHEDULE_FORMAT",
                message,
            },
            MedicineError::InvalidDuration { message } => ApiError::Rejected {
                code: "INVALID_DURATION",
                message,
            },
            MedicineError::InvalidDate { message } => ApiError::Rejected {
                code: "INVALID_DATE",
                message,
            },
            MedicineError::NotFound { message } => ApiError::NotFound(message),
            MedicineError::Internal { message } => ApiError::Internal(message),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let text = err.to_string();
        match err {
            AccountError::Conflict { message } => ApiError::Conflict(message),
            AccountError::NotFound { message } => ApiError::NotFound(message),
            AccountError::InvalidOtp => ApiError::Rejected {
                code: "INVALID_OTP",
                message: text,
            },
            AccountError::InvalidCredentials => ApiError::Rejected {
                code: "INVALID_CREDENTIALS",
                message: text,
            },
            AccountError::Internal { message } => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
