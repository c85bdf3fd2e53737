//! CDR (Call Detail Record) model
//!
//! The internal-sink projection of a completed call, persisted to the
//! `cdrs` table keyed by `call_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal CDR projection
///
/// Derived only for calls that pass the internal completeness gate;
/// `call_events` holds the sorted distinct event types for the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cdr {
    /// Call identifier, rendered as text
    pub call_id: String,

    /// Call start timestamp
    pub call_start: DateTime<Utc>,

    /// Call end timestamp
    pub call_end: DateTime<Utc>,

    /// Caller number
    pub caller_number: String,

    /// Callee number
    pub callee_number: String,

    /// Total call duration in whole seconds
    pub duration_sec: i64,

    /// Outcome code, verbatim from the call status
    pub call_result: String,

    /// Sorted distinct event types recorded for the call
    pub call_events: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_renders_call_id_as_text() {
        let cdr = Cdr {
            call_id: "100".to_string(),
            call_start: "2024-06-18T12:00:00Z".parse().unwrap(),
            call_end: "2024-06-18T12:05:00Z".parse().unwrap(),
            caller_number: "+79991112233".to_string(),
            callee_number: "54321".to_string(),
            duration_sec: 300,
            call_result: "COMPLETED".to_string(),
            call_events: vec!["hangup".to_string(), "start".to_string()],
        };

        let json = serde_json::to_value(&cdr).unwrap();
        assert_eq!(json["call_id"], "100");
        assert_eq!(json["duration_sec"], 300);
        assert_eq!(json["call_events"][0], "hangup");
    }
}
