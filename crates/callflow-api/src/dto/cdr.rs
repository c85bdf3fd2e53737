//! CDR and pipeline-trigger DTOs

use callflow_core::models::Cdr;
use callflow_core::traits::{CdrSummary, ResultCount};
use callflow_services::{RunReport, SinkKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Stored CDR as returned by the query endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CdrResponse {
    /// Call identifier (text)
    pub call_id: String,
    /// Call start timestamp
    pub call_start: DateTime<Utc>,
    /// Call end timestamp
    pub call_end: DateTime<Utc>,
    /// Caller number
    pub caller_number: String,
    /// Callee number
    pub callee_number: String,
    /// Duration in seconds
    pub duration_sec: i64,
    /// Call result code
    pub call_result: String,
    /// Sorted distinct event types
    pub call_events: Vec<String>,
}

impl From<Cdr> for CdrResponse {
    fn from(cdr: Cdr) -> Self {
        Self {
            call_id: cdr.call_id,
            call_start: cdr.call_start,
            call_end: cdr.call_end,
            caller_number: cdr.caller_number,
            callee_number: cdr.callee_number,
            duration_sec: cdr.duration_sec,
            call_result: cdr.call_result,
            call_events: cdr.call_events,
        }
    }
}

/// Summary statistics over stored CDRs
#[derive(Debug, Clone, Serialize)]
pub struct CdrStatsResponse {
    /// Total stored CDRs
    pub total_cdrs: i64,
    /// Sum of all durations in seconds
    pub total_duration_sec: i64,
    /// Average duration in seconds
    pub avg_duration_sec: i64,
    /// Counts per call result code
    pub by_result: Vec<ResultCount>,
}

impl From<CdrSummary> for CdrStatsResponse {
    fn from(summary: CdrSummary) -> Self {
        Self {
            total_cdrs: summary.total_cdrs,
            total_duration_sec: summary.total_duration_sec,
            avg_duration_sec: summary.avg_duration_sec,
            by_result: summary.by_result,
        }
    }
}

/// Outcome of a triggered pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    /// Run identifier
    pub run_id: Uuid,
    /// Sink the run delivered to
    pub sink: SinkKind,
    /// Calls present in the fetched snapshot
    pub calls_seen: usize,
    /// Calls that passed the completeness gate
    pub eligible_calls: usize,
    /// Records written/acknowledged by the sink
    pub records_delivered: u64,
}

impl From<RunReport> for TriggerResponse {
    fn from(report: RunReport) -> Self {
        Self {
            run_id: report.run_id,
            sink: report.sink,
            calls_seen: report.calls_seen,
            eligible_calls: report.eligible_calls,
            records_delivered: report.records_delivered,
        }
    }
}
