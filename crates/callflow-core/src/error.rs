//! Unified error handling for the callflow processor
//!
//! This module provides a single error type covering all failure scenarios
//! in the application, with automatic HTTP response mapping. The `error_code`
//! of a failed pipeline run identifies which phase of the run failed.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    // ==================== Pipeline Errors ====================
    /// A source could not be drained: transport failure or 5xx after
    /// exhausting retries. Aborts the run before any delivery.
    #[error("Source fetch failed: {0}")]
    SourceFetch(String),

    /// A source violated the cursor-pagination contract (non-advancing
    /// cursor, unexpected response shape, 4xx). Never retried.
    #[error("Source protocol violation: {0}")]
    SourceProtocol(String),

    /// Delivery to a sink failed after the snapshot was derived.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// A run of the same sink kind is already in flight.
    #[error("Run already in progress: {0}")]
    RunInProgress(String),

    /// The run exceeded its configured deadline before delivery.
    #[error("Run timed out: {0}")]
    RunTimedOut(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::RunInProgress(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            AppError::SourceFetch(_) | AppError::SourceProtocol(_) | AppError::Delivery(_) => {
                StatusCode::BAD_GATEWAY
            }

            // 504 Gateway Timeout
            AppError::RunTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::SourceFetch(_) => "source_fetch_error",
            AppError::SourceProtocol(_) => "source_protocol_error",
            AppError::Delivery(_) => "delivery_error",
            AppError::RunInProgress(_) => "run_in_progress",
            AppError::RunTimedOut(_) => "run_timed_out",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
