//! Source drain loop
//!
//! Repeatedly requests pages starting with no cursor until a response
//! carries a null next-cursor, accumulating all returned items. Transient
//! failures are retried with bounded backoff; exhausting retries fails the
//! fetch, which aborts the whole run.

use callflow_core::{
    config::SourcesConfig,
    traits::{Page, PageSource},
    AppError, AppResult,
};
use std::time::Duration;
use tracing::{info, warn};

/// Retry and page-size policy for draining a source
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Page size requested from the source
    pub fetch_limit: i64,

    /// Attempts per page before giving up
    pub retry_attempts: u32,

    /// Base backoff between attempts; grows linearly with the attempt number
    pub retry_backoff: Duration,
}

impl FetchPolicy {
    pub fn new(fetch_limit: i64, retry_attempts: u32, retry_backoff: Duration) -> Self {
        Self {
            fetch_limit,
            retry_attempts: retry_attempts.max(1),
            retry_backoff,
        }
    }
}

impl From<&SourcesConfig> for FetchPolicy {
    fn from(config: &SourcesConfig) -> Self {
        Self::new(
            config.fetch_limit,
            config.retry_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }
}

/// Drains one paginated source to a complete in-memory collection
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    policy: FetchPolicy,
}

impl SourceFetcher {
    /// Create a fetcher with the given policy
    pub fn new(policy: FetchPolicy) -> Self {
        Self { policy }
    }

    /// Fetch every item the source has
    ///
    /// A response with zero results and a null cursor is a valid, exhausted
    /// source. The cursor must strictly advance between pages; a source
    /// that repeats a cursor violates the pagination contract.
    pub async fn drain<T: Send>(
        &self,
        source: &dyn PageSource<T>,
        name: &str,
    ) -> AppResult<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<i64> = None;
        let mut pages = 0u32;

        loop {
            let page = self.fetch_page_with_retry(source, name, cursor).await?;
            pages += 1;
            items.extend(page.results);

            match page.next_cursor {
                None => break,
                Some(next) => {
                    if cursor.is_some_and(|current| next <= current) {
                        return Err(AppError::SourceProtocol(format!(
                            "{} source cursor did not advance past {}",
                            name, next
                        )));
                    }
                    cursor = Some(next);
                }
            }
        }

        info!("Drained {} source: {} items in {} pages", name, items.len(), pages);

        Ok(items)
    }

    async fn fetch_page_with_retry<T: Send>(
        &self,
        source: &dyn PageSource<T>,
        name: &str,
        cursor: Option<i64>,
    ) -> AppResult<Page<T>> {
        let mut attempt = 1u32;
        loop {
            match source.fetch_page(cursor, self.policy.fetch_limit).await {
                Ok(page) => return Ok(page),
                Err(AppError::SourceFetch(msg)) if attempt < self.policy.retry_attempts => {
                    warn!(
                        "Transient {} source failure (attempt {}/{}): {}",
                        name, attempt, self.policy.retry_attempts, msg
                    );
                    tokio::time::sleep(self.policy.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// In-memory source paginating ascending integers, mirroring the wire
    /// contract: next_cursor = last id of a full page, null otherwise
    struct VecSource {
        items: Vec<i64>,
        calls: AtomicU32,
    }

    impl VecSource {
        fn new(items: Vec<i64>) -> Self {
            Self {
                items,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource<i64> for VecSource {
        async fn fetch_page(&self, cursor: Option<i64>, limit: i64) -> AppResult<Page<i64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let results: Vec<i64> = self
                .items
                .iter()
                .copied()
                .filter(|id| cursor.map_or(true, |c| *id > c))
                .take(limit as usize)
                .collect();
            let next_cursor = if results.len() == limit as usize {
                results.last().copied()
            } else {
                None
            };
            Ok(Page {
                results,
                next_cursor,
            })
        }
    }

    /// Source failing the first `failures` requests with a transient error
    struct FlakySource {
        inner: VecSource,
        failures: u32,
        seen: AtomicU32,
    }

    #[async_trait]
    impl PageSource<i64> for FlakySource {
        async fn fetch_page(&self, cursor: Option<i64>, limit: i64) -> AppResult<Page<i64>> {
            let n = self.seen.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(AppError::SourceFetch("connection refused".to_string()));
            }
            self.inner.fetch_page(cursor, limit).await
        }
    }

    /// Source that always answers with the same non-advancing cursor
    struct StuckSource;

    #[async_trait]
    impl PageSource<i64> for StuckSource {
        async fn fetch_page(&self, _cursor: Option<i64>, _limit: i64) -> AppResult<Page<i64>> {
            Ok(Page {
                results: vec![7],
                next_cursor: Some(7),
            })
        }
    }

    fn fetcher(limit: i64) -> SourceFetcher {
        SourceFetcher::new(FetchPolicy::new(limit, 3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_drain_collects_all_pages() {
        let source = VecSource::new((1..=12).collect());
        let items = fetcher(5).drain(&source, "calls").await.unwrap();

        assert_eq!(items, (1..=12).collect::<Vec<i64>>());
        // 12 items at page size 5: pages of 5, 5, 2
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drain_full_last_page_takes_one_extra_request() {
        // 10 items at page size 5: the second page is full, so exhaustion
        // is only visible on the empty third page
        let source = VecSource::new((1..=10).collect());
        let items = fetcher(5).drain(&source, "calls").await.unwrap();

        assert_eq!(items.len(), 10);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drain_empty_source_is_not_an_error() {
        let source = VecSource::new(vec![]);
        let items = fetcher(5).drain(&source, "operators").await.unwrap();

        assert!(items.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drain_retries_transient_failures() {
        let source = FlakySource {
            inner: VecSource::new(vec![1, 2, 3]),
            failures: 2,
            seen: AtomicU32::new(0),
        };

        let items = fetcher(10).drain(&source, "events").await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_retry_attempts() {
        let source = FlakySource {
            inner: VecSource::new(vec![1]),
            failures: u32::MAX,
            seen: AtomicU32::new(0),
        };

        let result = fetcher(10).drain(&source, "events").await;
        assert!(matches!(result, Err(AppError::SourceFetch(_))));
        assert_eq!(source.seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drain_does_not_retry_protocol_errors() {
        struct BadSource {
            calls: AtomicU32,
        }

        #[async_trait]
        impl PageSource<i64> for BadSource {
            async fn fetch_page(&self, _c: Option<i64>, _l: i64) -> AppResult<Page<i64>> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::SourceProtocol("HTTP 404".to_string()))
            }
        }

        let source = BadSource {
            calls: AtomicU32::new(0),
        };
        let result = fetcher(10).drain(&source, "calls").await;

        assert!(matches!(result, Err(AppError::SourceProtocol(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drain_detects_non_advancing_cursor() {
        let result = fetcher(10).drain(&StuckSource, "connections").await;
        assert!(matches!(result, Err(AppError::SourceProtocol(_))));
    }
}
