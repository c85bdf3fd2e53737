//! Snapshot aggregation
//!
//! Builds call-keyed and operator-keyed lookup structures from the four
//! fetched collections. Nothing is filtered here; deciding which calls are
//! complete is the completeness gate's job.

use callflow_core::models::{Call, CallEvent, Connection, Operator};
use std::collections::HashMap;
use tracing::debug;

/// Joined view over one run's fetched snapshot
#[derive(Debug, Default)]
pub struct CallDataSet {
    /// Calls by call identifier
    pub calls: HashMap<i64, Call>,

    /// Events grouped by owning call identifier
    pub events_by_call: HashMap<i64, Vec<CallEvent>>,

    /// Operators by operator identifier (same namespace as `Call::user_id`)
    pub operators: HashMap<i64, Operator>,

    /// The timing-relevant connection per call. When a source supplies more
    /// than one connection for a call, the one with the lowest
    /// `connection_id` is authoritative.
    pub connection_by_call: HashMap<i64, Connection>,
}

impl CallDataSet {
    /// Join the four collections into lookup structures
    pub fn build(
        calls: Vec<Call>,
        connections: Vec<Connection>,
        events: Vec<CallEvent>,
        operators: Vec<Operator>,
    ) -> Self {
        let calls: HashMap<i64, Call> = calls.into_iter().map(|c| (c.id, c)).collect();

        let mut events_by_call: HashMap<i64, Vec<CallEvent>> = HashMap::new();
        for event in events {
            events_by_call.entry(event.call_id).or_default().push(event);
        }

        let operators: HashMap<i64, Operator> =
            operators.into_iter().map(|o| (o.operator_id, o)).collect();

        let mut connection_by_call: HashMap<i64, Connection> = HashMap::new();
        for conn in connections {
            match connection_by_call.get(&conn.call_id) {
                Some(existing) if existing.connection_id <= conn.connection_id => {}
                _ => {
                    connection_by_call.insert(conn.call_id, conn);
                }
            }
        }

        debug!(
            "Aggregated snapshot: {} calls, {} calls with events, {} operators, {} connections",
            calls.len(),
            events_by_call.len(),
            operators.len(),
            connection_by_call.len()
        );

        Self {
            calls,
            events_by_call,
            operators,
            connection_by_call,
        }
    }

    /// Call identifiers in ascending order, for deterministic output
    pub fn call_ids_sorted(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.calls.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Events recorded for a call, empty when none
    pub fn events_for(&self, call_id: i64) -> &[CallEvent] {
        self.events_by_call
            .get(&call_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The operator owning a call, if the call's user has one
    pub fn operator_for(&self, call: &Call) -> Option<&Operator> {
        self.operators.get(&call.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: i64, user_id: i64) -> Call {
        Call {
            id,
            status: "COMPLETED".to_string(),
            started_at: "2024-06-18T12:00:00Z".parse().unwrap(),
            finished_at: "2024-06-18T12:05:00Z".parse().unwrap(),
            caller_number: "+79991112233".to_string(),
            callee_number: "54321".to_string(),
            user_id,
            context: serde_json::Value::Null,
        }
    }

    fn connection(connection_id: i64, call_id: i64) -> Connection {
        Connection {
            connection_id,
            call_id,
            phone: "+79991112233".to_string(),
            initiated_at: "2024-06-18T12:00:00Z".parse().unwrap(),
            answered_at: None,
            finished_at: None,
        }
    }

    fn event(event_id: i64, call_id: i64, event_type: &str) -> CallEvent {
        CallEvent {
            event_id,
            call_id,
            event_type: event_type.to_string(),
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_build_groups_events_by_call() {
        let data = CallDataSet::build(
            vec![call(100, 200), call(101, 201)],
            vec![],
            vec![
                event(1, 100, "start"),
                event(2, 100, "hangup"),
                event(3, 101, "start"),
            ],
            vec![],
        );

        assert_eq!(data.events_for(100).len(), 2);
        assert_eq!(data.events_for(101).len(), 1);
        assert!(data.events_for(102).is_empty());
    }

    #[test]
    fn test_lowest_connection_id_wins() {
        // Insertion order must not matter
        let data = CallDataSet::build(
            vec![call(100, 200)],
            vec![connection(5, 100), connection(2, 100), connection(9, 100)],
            vec![],
            vec![],
        );

        assert_eq!(data.connection_by_call[&100].connection_id, 2);
    }

    #[test]
    fn test_nothing_is_filtered_during_aggregation() {
        // Events and connections for unknown calls are kept; gating decides later
        let data = CallDataSet::build(
            vec![call(100, 200)],
            vec![connection(1, 999)],
            vec![event(1, 888, "start")],
            vec![],
        );

        assert!(data.connection_by_call.contains_key(&999));
        assert!(data.events_by_call.contains_key(&888));
    }

    #[test]
    fn test_call_ids_sorted() {
        let data = CallDataSet::build(
            vec![call(300, 1), call(100, 1), call(200, 1)],
            vec![],
            vec![],
            vec![],
        );

        assert_eq!(data.call_ids_sorted(), vec![100, 200, 300]);
    }
}
