//! Callflow Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the callflow CDR processor. It includes:
//!
//! - Domain models (Call, Connection, CallEvent, Operator, CDR projections)
//! - Traits for paginated sources and delivery sinks
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
