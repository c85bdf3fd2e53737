//! Common traits for sources and sinks
//!
//! Defines the cursor-pagination contract the pipeline depends on and the
//! delivery abstractions for both sink kinds.

use crate::error::AppError;
use crate::models::{Cdr, ExternalCdrRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated source
///
/// `next_cursor` is null when the page reached the end of the available
/// data; otherwise it equals the identifier of the last item returned and
/// must be supplied as the cursor on the next request.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Items on this page, ascending by natural identifier
    pub results: Vec<T>,

    /// Cursor for the next request; None when exhausted
    pub next_cursor: Option<i64>,
}

/// A cursor-paginated data source
///
/// The pipeline depends only on this contract, never on how the backing
/// store pages its data.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch one page starting after `cursor` (None for the first page)
    async fn fetch_page(&self, cursor: Option<i64>, limit: i64) -> Result<Page<T>, AppError>;
}

/// Summary statistics over stored CDRs
#[derive(Debug, Clone, Serialize)]
pub struct CdrSummary {
    /// Total stored CDRs
    pub total_cdrs: i64,

    /// Sum of all durations in seconds
    pub total_duration_sec: i64,

    /// Average duration in seconds, 0 when no CDRs are stored
    pub avg_duration_sec: i64,

    /// CDR counts per call result code
    pub by_result: Vec<ResultCount>,
}

/// Count of CDRs sharing one call result code
#[derive(Debug, Clone, Serialize)]
pub struct ResultCount {
    /// Call result code
    pub call_result: String,

    /// Number of CDRs with that result
    pub count: i64,
}

/// CDR repository trait (the persistent sink)
#[async_trait]
pub trait CdrRepository: Send + Sync {
    /// Upsert a batch of CDRs keyed by call identifier
    ///
    /// Re-running with identical upstream data must not create duplicate
    /// rows and must not fail merely because a row already exists.
    /// Returns the number of rows written.
    async fn upsert_batch(&self, cdrs: &[Cdr]) -> Result<u64, AppError>;

    /// Find a CDR by call identifier
    async fn find_by_call_id(&self, call_id: &str) -> Result<Option<Cdr>, AppError>;

    /// List CDRs ordered by call start, newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Cdr>, i64), AppError>;

    /// Count total stored CDRs
    async fn count(&self) -> Result<i64, AppError>;

    /// Summary statistics over all stored CDRs
    async fn summary_stats(&self) -> Result<CdrSummary, AppError>;
}

/// External CDR delivery trait (the remote sink)
#[async_trait]
pub trait ExternalCdrSink: Send + Sync {
    /// Deliver the full run batch in one call; the batch is never empty
    ///
    /// Returns the number of records the receiver acknowledged.
    async fn deliver_batch(&self, records: &[ExternalCdrRecord]) -> Result<u64, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
