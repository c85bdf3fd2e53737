//! Callflow source layer
//!
//! This crate drains the four cursor-paginated upstream sources into
//! complete in-memory collections. It includes:
//!
//! - `HttpPageSource`, a reqwest-backed implementation of the pagination
//!   contract that tolerates malformed individual records
//! - `SourceFetcher`, the drain loop with bounded retry/backoff
//!
//! The pipeline only ever sees the `PageSource` trait from callflow-core,
//! so any backing store honoring the cursor contract can be substituted.

pub mod fetcher;
pub mod http;

pub use fetcher::{FetchPolicy, SourceFetcher};
pub use http::HttpPageSource;

// Re-export commonly used types
pub use callflow_core::{AppError, AppResult};
