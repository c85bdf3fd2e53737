//! Completeness gate
//!
//! Per call, per sink kind, decides whether enough corroborating data was
//! fetched to safely produce a record. Gating follows each sink's field
//! dependencies: the external projection reads connection timestamps, so
//! external eligibility additionally requires a connection.

use crate::aggregator::CallDataSet;
use serde::Serialize;

/// Delivery target kind for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Persistent relational store
    Internal,
    /// Remote batch webhook
    External,
}

impl SinkKind {
    /// Stable label used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Internal => "internal",
            SinkKind::External => "external",
        }
    }
}

/// Decide whether a call has enough joined data for the given sink
///
/// Internal: the call exists, has at least one event, and its owning user
/// maps to an operator. External: additionally requires a connection.
/// Absence of any required fact excludes the call entirely; no partial
/// record is ever emitted.
pub fn is_eligible(data: &CallDataSet, kind: SinkKind, call_id: i64) -> bool {
    let Some(call) = data.calls.get(&call_id) else {
        return false;
    };

    let has_events = !data.events_for(call_id).is_empty();
    let has_operator = data.operator_for(call).is_some();

    match kind {
        SinkKind::Internal => has_events && has_operator,
        SinkKind::External => {
            has_events && has_operator && data.connection_by_call.contains_key(&call_id)
        }
    }
}
