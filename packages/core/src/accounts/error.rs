//! Error types for the signup and login flow

use thiserror::Error;

use crate::medicine::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AccountError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        AccountError::internal(err.to_string())
    }
}
