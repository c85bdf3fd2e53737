//! Repository implementations
//!
//! Concrete implementations of the sink traits defined in callflow-core,
//! using sqlx for PostgreSQL access.

pub mod cdr_repo;

pub use cdr_repo::PgCdrRepository;
