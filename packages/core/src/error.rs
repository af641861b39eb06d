use std::error::Error;
use std::fmt;

/// Startup and wiring errors.
///
/// Request-level failures use [`crate::api::error::ApiError`]; this type
/// covers everything that can stop the service from coming up.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Database(String),
    Network(String),
    Metrics(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
        }
    }
}

impl Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Metrics(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Network(err.to_string())
    }
}
