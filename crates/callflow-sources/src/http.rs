//! HTTP implementation of the cursor-pagination contract
//!
//! Speaks the source wire protocol: GET with optional `cursor` and `limit`
//! query parameters, response `{ "results": [...], "next_cursor": <id|null> }`.

use callflow_core::{
    traits::{Page, PageSource},
    AppError, AppResult,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// A paginated source behind an HTTP endpoint
///
/// Generic over the record type; records that fail to deserialize are
/// skipped without failing the page (the rest of the pagination continues).
pub struct HttpPageSource<T> {
    client: reqwest::Client,
    endpoint: String,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

/// Page shape as it appears on the wire, items still undecoded
#[derive(Debug, Deserialize)]
struct RawPage {
    results: Vec<serde_json::Value>,
    next_cursor: Option<i64>,
}

impl<T> HttpPageSource<T> {
    /// Create a source client for one endpoint
    ///
    /// `name` labels the source in logs and errors ("calls", "operators", ...).
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// The source label
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Decode a page body, skipping records that do not match the expected shape
pub(crate) fn decode_page<T: DeserializeOwned>(body: &str, source: &str) -> AppResult<Page<T>> {
    let raw: RawPage = serde_json::from_str(body).map_err(|e| {
        AppError::SourceProtocol(format!("{} source returned unexpected shape: {}", source, e))
    })?;

    let total = raw.results.len();
    let mut results = Vec::with_capacity(total);
    for item in raw.results {
        match serde_json::from_value::<T>(item) {
            Ok(record) => results.push(record),
            Err(e) => {
                warn!("Skipping malformed {} record: {}", source, e);
            }
        }
    }

    if results.len() < total {
        debug!(
            "Decoded {}/{} records from {} page",
            results.len(),
            total,
            source
        );
    }

    Ok(Page {
        results,
        next_cursor: raw.next_cursor,
    })
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + Sync,
{
    async fn fetch_page(&self, cursor: Option<i64>, limit: i64) -> AppResult<Page<T>> {
        let mut request = self.client.get(&self.endpoint).query(&[("limit", limit)]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        debug!(
            "Fetching {} page: cursor={:?}, limit={}",
            self.name, cursor, limit
        );

        let response = request.send().await.map_err(|e| {
            AppError::SourceFetch(format!("{} source request failed: {}", self.name, e))
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AppError::SourceFetch(format!(
                "{} source returned HTTP {}",
                self.name, status
            )));
        }
        if !status.is_success() {
            return Err(AppError::SourceProtocol(format!(
                "{} source returned HTTP {}",
                self.name, status
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::SourceFetch(format!("{} source body read failed: {}", self.name, e))
        })?;

        decode_page(&body, &self.name)
    }
}
