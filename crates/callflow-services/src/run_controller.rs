//! Run orchestration
//!
//! One end-to-end pipeline run per admin trigger: drain the four sources
//! concurrently, aggregate the snapshot, gate each call for the requested
//! sink kind, derive the projection, deliver. Runs of the same kind are
//! serialized by a single-flight guard; runs of different kinds are
//! independent.

use crate::aggregator::CallDataSet;
use crate::completeness::{is_eligible, SinkKind};
use crate::derive::{external_record, internal_cdr};
use callflow_core::{
    config::PipelineConfig,
    models::{Call, CallEvent, Cdr, Connection, ExternalCdrRecord, Operator},
    traits::{CdrRepository, ExternalCdrSink, PageSource},
    AppError, AppResult,
};
use callflow_sources::SourceFetcher;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// The four paginated sources one run drains
pub struct SourceSet {
    pub calls: Arc<dyn PageSource<Call>>,
    pub connections: Arc<dyn PageSource<Connection>>,
    pub call_events: Arc<dyn PageSource<CallEvent>>,
    pub operators: Arc<dyn PageSource<Operator>>,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier of this run, also present in its tracing span
    pub run_id: Uuid,

    /// Which sink the run delivered to
    pub sink: SinkKind,

    /// Calls present in the fetched snapshot
    pub calls_seen: usize,

    /// Calls that passed the completeness gate
    pub eligible_calls: usize,

    /// Records actually written/acknowledged by the sink
    pub records_delivered: u64,
}

/// Executes pipeline runs, one per admin trigger
pub struct PipelineRunner {
    sources: SourceSet,
    fetcher: SourceFetcher,
    cdr_repo: Arc<dyn CdrRepository>,
    external_sink: Arc<dyn ExternalCdrSink>,
    config: PipelineConfig,
    internal_guard: Mutex<()>,
    external_guard: Mutex<()>,
}

impl PipelineRunner {
    /// Create a runner over the given sources and sinks
    pub fn new(
        sources: SourceSet,
        fetcher: SourceFetcher,
        cdr_repo: Arc<dyn CdrRepository>,
        external_sink: Arc<dyn ExternalCdrSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            sources,
            fetcher,
            cdr_repo,
            external_sink,
            config,
            internal_guard: Mutex::new(()),
            external_guard: Mutex::new(()),
        }
    }

    /// Execute one run end-to-end for the given sink kind
    ///
    /// Fails without doing any work if a run of the same kind is already in
    /// flight. The fetch phase runs under the configured deadline, and the
    /// deadline is re-checked before delivery so an expired run never
    /// reaches a sink.
    #[instrument(skip(self))]
    pub async fn run(&self, kind: SinkKind) -> AppResult<RunReport> {
        let guard = match kind {
            SinkKind::Internal => &self.internal_guard,
            SinkKind::External => &self.external_guard,
        };
        let _inflight = guard.try_lock().map_err(|_| {
            AppError::RunInProgress(format!("{} run already in flight", kind.as_str()))
        })?;

        let run_id = Uuid::new_v4();
        let deadline = Instant::now() + Duration::from_secs(self.config.run_timeout_secs);

        info!(%run_id, "Starting {} pipeline run", kind.as_str());

        let (calls, connections, events, operators) =
            tokio::time::timeout_at(deadline, self.fetch_snapshot())
                .await
                .map_err(|_| {
                    AppError::RunTimedOut("deadline exceeded while fetching sources".to_string())
                })??;

        let data = CallDataSet::build(calls, connections, events, operators);
        let calls_seen = data.calls.len();

        let eligible: Vec<i64> = data
            .call_ids_sorted()
            .into_iter()
            .filter(|id| is_eligible(&data, kind, *id))
            .collect();

        info!(
            %run_id,
            "Gated snapshot: {} of {} calls eligible for {} sink",
            eligible.len(),
            calls_seen,
            kind.as_str()
        );

        let records_delivered = match kind {
            SinkKind::Internal => self.deliver_internal(&data, &eligible, deadline).await?,
            SinkKind::External => self.deliver_external(&data, &eligible, deadline).await?,
        };

        info!(
            %run_id,
            "Completed {} pipeline run: {} records delivered",
            kind.as_str(),
            records_delivered
        );

        Ok(RunReport {
            run_id,
            sink: kind,
            calls_seen,
            eligible_calls: eligible.len(),
            records_delivered,
        })
    }

    /// Drain all four sources concurrently
    ///
    /// The run does not proceed to aggregation until every fetch finished;
    /// any single failure aborts the whole run.
    async fn fetch_snapshot(
        &self,
    ) -> AppResult<(Vec<Call>, Vec<Connection>, Vec<CallEvent>, Vec<Operator>)> {
        tokio::try_join!(
            self.fetcher.drain(self.sources.calls.as_ref(), "calls"),
            self.fetcher
                .drain(self.sources.connections.as_ref(), "connections"),
            self.fetcher
                .drain(self.sources.call_events.as_ref(), "call_events"),
            self.fetcher.drain(self.sources.operators.as_ref(), "operators"),
        )
    }

    async fn deliver_internal(
        &self,
        data: &CallDataSet,
        eligible: &[i64],
        deadline: Instant,
    ) -> AppResult<u64> {
        let cdrs: Vec<Cdr> = eligible
            .iter()
            .map(|id| internal_cdr(&data.calls[id], data.events_for(*id)))
            .collect();

        ensure_deadline(deadline, "persistent store delivery")?;

        self.cdr_repo
            .upsert_batch(&cdrs)
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))
    }

    async fn deliver_external(
        &self,
        data: &CallDataSet,
        eligible: &[i64],
        deadline: Instant,
    ) -> AppResult<u64> {
        let records: Vec<ExternalCdrRecord> = eligible
            .iter()
            .filter_map(|id| {
                let call = &data.calls[id];
                // Gating guarantees the operator and connection exist here
                let operator = data.operator_for(call)?;
                let connection = data.connection_by_call.get(id)?;
                external_record(call, operator, connection, self.config.include_unanswered)
            })
            .collect();

        if records.is_empty() {
            info!("No external CDR records to deliver; skipping webhook call");
            return Ok(0);
        }

        ensure_deadline(deadline, "external batch delivery")?;

        self.external_sink.deliver_batch(&records).await
    }
}

fn ensure_deadline(deadline: Instant, phase: &str) -> AppResult<()> {
    if Instant::now() >= deadline {
        return Err(AppError::RunTimedOut(format!(
            "deadline exceeded before {}",
            phase
        )));
    }
    Ok(())
}
