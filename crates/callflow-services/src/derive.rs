//! Sink-specific field derivation
//!
//! Computes the derived projections for calls that passed the completeness
//! gate. Identifiers are rendered as text in both projections regardless of
//! their numeric source representation.

use callflow_core::models::{Call, CallEvent, Cdr, Connection, ExternalCdrRecord, Operator};

/// Derive the internal CDR projection for an eligible call
pub fn internal_cdr(call: &Call, events: &[CallEvent]) -> Cdr {
    let mut event_types: Vec<String> = events.iter().map(|e| e.event_type.clone()).collect();
    event_types.sort();
    event_types.dedup();

    Cdr {
        call_id: call.id.to_string(),
        call_start: call.started_at,
        call_end: call.finished_at,
        caller_number: call.caller_number.clone(),
        callee_number: call.callee_number.clone(),
        duration_sec: call.duration_sec(),
        call_result: call.status.clone(),
        call_events: event_types,
    }
}

/// Derive the external record for an eligible call
///
/// `agent_status` is "ANSWERED" exactly when the connection carries an
/// answer timestamp; otherwise the call's status code stands in. Unanswered
/// calls have no meaningful wait/talk timing: they are emitted with null
/// timing when `include_unanswered` is set and dropped from the batch
/// otherwise.
pub fn external_record(
    call: &Call,
    operator: &Operator,
    connection: &Connection,
    include_unanswered: bool,
) -> Option<ExternalCdrRecord> {
    let (agent_status, wait_sec, talk_sec) = match connection.answered_at {
        Some(answered) => {
            // A connection missing its own finish timestamp falls back to
            // the call-level end for talk timing.
            let talk_end = connection.finished_at.unwrap_or(call.finished_at);
            (
                ExternalCdrRecord::ANSWERED.to_string(),
                connection.wait_sec(),
                Some((talk_end - answered).num_seconds().max(0)),
            )
        }
        None => {
            if !include_unanswered {
                return None;
            }
            (call.status.clone(), None, None)
        }
    };

    Some(ExternalCdrRecord {
        call_id: call.id.to_string(),
        call_start: call.started_at,
        call_end: call.finished_at,
        caller_number: call.caller_number.clone(),
        operator_id: operator.operator_id.to_string(),
        operator_name: operator.name.clone(),
        agent_status,
        wait_sec,
        talk_sec,
        end_reason: call.status.clone(),
    })
}
