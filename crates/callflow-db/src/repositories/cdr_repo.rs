//! CDR repository implementation (the persistent sink)
//!
//! PostgreSQL-backed storage for derived call detail records. Writes are
//! upserts keyed by `call_id`: re-running the pipeline with unchanged
//! upstream data yields exactly one row per eligible call.

use callflow_core::{
    models::Cdr,
    traits::{CdrRepository, CdrSummary, ResultCount},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Default number of concurrent upserts per batch
const DEFAULT_UPSERT_CONCURRENCY: usize = 8;

/// PostgreSQL implementation of CdrRepository
pub struct PgCdrRepository {
    pool: PgPool,
    upsert_concurrency: usize,
}

const CDR_SELECT_COLUMNS: &str = r#"
    call_id, call_start, call_end,
    caller_number, callee_number,
    duration_sec, call_result, call_events
"#;

impl PgCdrRepository {
    /// Create a new CDR repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            upsert_concurrency: DEFAULT_UPSERT_CONCURRENCY,
        }
    }

    /// Override the number of concurrent upserts per batch
    pub fn with_upsert_concurrency(mut self, concurrency: usize) -> Self {
        self.upsert_concurrency = concurrency.max(1);
        self
    }

    async fn upsert_one(&self, cdr: &Cdr) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO cdrs (
                call_id, call_start, call_end,
                caller_number, callee_number,
                duration_sec, call_result, call_events
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (call_id) DO UPDATE SET
                call_start = EXCLUDED.call_start,
                call_end = EXCLUDED.call_end,
                caller_number = EXCLUDED.caller_number,
                callee_number = EXCLUDED.callee_number,
                duration_sec = EXCLUDED.duration_sec,
                call_result = EXCLUDED.call_result,
                call_events = EXCLUDED.call_events
            "#,
        )
        .bind(&cdr.call_id)
        .bind(cdr.call_start)
        .bind(cdr.call_end)
        .bind(&cdr.caller_number)
        .bind(&cdr.callee_number)
        .bind(cdr.duration_sec)
        .bind(&cdr.call_result)
        .bind(&cdr.call_events)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error upserting CDR {}: {}", cdr.call_id, e);
            AppError::Database(format!("Failed to upsert CDR {}: {}", cdr.call_id, e))
        })?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CdrRepository for PgCdrRepository {
    #[instrument(skip(self, cdrs), fields(batch = cdrs.len()))]
    async fn upsert_batch(&self, cdrs: &[Cdr]) -> AppResult<u64> {
        if cdrs.is_empty() {
            return Ok(0);
        }

        debug!("Upserting batch of {} CDRs", cdrs.len());

        // Each upsert is independently keyed, so ordering between them is
        // not significant and they can run concurrently.
        let upserts: Vec<_> = cdrs.iter().map(|cdr| self.upsert_one(cdr)).collect();
        let written = stream::iter(upserts)
            .buffer_unordered(self.upsert_concurrency)
            .try_fold(0u64, |acc, rows| async move { Ok(acc + rows) })
            .await?;

        Ok(written)
    }

    #[instrument(skip(self))]
    async fn find_by_call_id(&self, call_id: &str) -> AppResult<Option<Cdr>> {
        debug!("Finding CDR by call_id: {}", call_id);

        let query = format!(
            "SELECT {} FROM cdrs WHERE call_id = $1",
            CDR_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, CdrRow>(&query)
            .bind(call_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding CDR {}: {}", call_id, e);
                AppError::Database(format!("Failed to find CDR: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Cdr>, i64)> {
        debug!("Listing CDRs with limit {} offset {}", limit, offset);

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cdrs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting CDRs: {}", e);
                AppError::Database(format!("Failed to count CDRs: {}", e))
            })?;

        let query = format!(
            "SELECT {} FROM cdrs ORDER BY call_start DESC LIMIT $1 OFFSET $2",
            CDR_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CdrRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing CDRs: {}", e);
                AppError::Database(format!("Failed to fetch CDRs: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cdrs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting CDRs: {}", e);
                AppError::Database(format!("Failed to count CDRs: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn summary_stats(&self) -> AppResult<CdrSummary> {
        debug!("Computing CDR summary statistics");

        let totals: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(duration_sec), 0)::BIGINT FROM cdrs",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error computing CDR totals: {}", e);
            AppError::Database(format!("Failed to compute CDR totals: {}", e))
        })?;

        let by_result: Vec<(String, i64)> = sqlx::query_as(
            "SELECT call_result, COUNT(*) FROM cdrs GROUP BY call_result ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error grouping CDRs by result: {}", e);
            AppError::Database(format!("Failed to group CDRs: {}", e))
        })?;

        let (total_cdrs, total_duration_sec) = totals;
        let avg_duration_sec = if total_cdrs > 0 {
            total_duration_sec / total_cdrs
        } else {
            0
        };

        Ok(CdrSummary {
            total_cdrs,
            total_duration_sec,
            avg_duration_sec,
            by_result: by_result
                .into_iter()
                .map(|(call_result, count)| ResultCount { call_result, count })
                .collect(),
        })
    }
}

/// Helper struct for mapping database rows to the domain model
#[derive(Debug, sqlx::FromRow)]
struct CdrRow {
    call_id: String,
    call_start: DateTime<Utc>,
    call_end: DateTime<Utc>,
    caller_number: String,
    callee_number: String,
    duration_sec: i64,
    call_result: String,
    call_events: Vec<String>,
}

impl From<CdrRow> for Cdr {
    fn from(row: CdrRow) -> Self {
        Self {
            call_id: row.call_id,
            call_start: row.call_start,
            call_end: row.call_end,
            caller_number: row.caller_number,
            callee_number: row.callee_number,
            duration_sec: row.duration_sec,
            call_result: row.call_result,
            call_events: row.call_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdr_row_conversion() {
        let row = CdrRow {
            call_id: "100".to_string(),
            call_start: "2024-06-18T12:00:00Z".parse().unwrap(),
            call_end: "2024-06-18T12:05:00Z".parse().unwrap(),
            caller_number: "+79991112233".to_string(),
            callee_number: "54321".to_string(),
            duration_sec: 300,
            call_result: "COMPLETED".to_string(),
            call_events: vec!["hangup".to_string(), "start".to_string()],
        };

        let cdr: Cdr = row.into();
        assert_eq!(cdr.call_id, "100");
        assert_eq!(cdr.duration_sec, 300);
        assert_eq!(cdr.call_events, vec!["hangup", "start"]);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_upsert_batch_is_idempotent() {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/callflow".to_string());
        let pool = crate::create_pool(&database_url, Some(2)).await.unwrap();
        let repo = PgCdrRepository::new(pool);

        let cdr = Cdr {
            call_id: "test-idempotence-100".to_string(),
            call_start: "2024-06-18T12:00:00Z".parse().unwrap(),
            call_end: "2024-06-18T12:05:00Z".parse().unwrap(),
            caller_number: "+79991112233".to_string(),
            callee_number: "54321".to_string(),
            duration_sec: 300,
            call_result: "COMPLETED".to_string(),
            call_events: vec!["hangup".to_string(), "start".to_string()],
        };

        repo.upsert_batch(std::slice::from_ref(&cdr)).await.unwrap();
        repo.upsert_batch(std::slice::from_ref(&cdr)).await.unwrap();

        let stored = repo.find_by_call_id("test-idempotence-100").await.unwrap();
        assert!(stored.is_some());
    }
}
