//! Callflow Database Layer
//!
//! This crate provides PostgreSQL database access for the callflow
//! processor. It includes:
//!
//! - Connection pool management with sqlx
//! - The CDR repository (the pipeline's persistent sink), with idempotent
//!   upserts keyed by call identifier
//!
//! Uses runtime queries (not compile-time macros) to avoid requiring a
//! database connection at build time.

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use callflow_core::{AppError, AppResult};
pub use sqlx::PgPool;
