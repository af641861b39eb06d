//! Error types for medicine scheduling and adherence tracking

use thiserror::Error;

/// Errors returned by the schedule engine, the adherence ledger and the
/// medicine service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MedicineError {
    #[error("Invalid scheduled time format: {message}")]
    InvalidScheduleFormat { message: String },

    #[error("Invalid duration: {message}")]
    InvalidDuration { message: String },

    #[error("Invalid date: {message}")]
    InvalidDate { message: String },

    #[error("Medicine not found: {message}")]
    NotFound { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MedicineError {
    pub fn invalid_schedule_format(message: impl Into<String>) -> Self {
        Self::InvalidScheduleFormat { message: message.into() }
    }

    pub fn invalid_duration(message: impl Into<String>) -> Self {
        Self::InvalidDuration { message: message.into() }
    }

    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidScheduleFormat { .. } => "InvalidScheduleFormat",
            Self::InvalidDuration { .. } => "InvalidDuration",
            Self::InvalidDate { .. } => "InvalidDate",
            Self::NotFound { .. } => "NotFound",
            Self::Internal { .. } => "InternalError",
        }
    }
}

/// Errors raised by persistence backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for MedicineError {
    fn from(err: StoreError) -> Self {
        MedicineError::internal(err.to_string())
    }
}
