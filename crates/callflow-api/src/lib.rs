//! API layer for the callflow processor
//!
//! HTTP handlers for the admin pipeline triggers and stored-CDR queries.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{configure_admin, configure_cdrs};
