//! Call model
//!
//! Source of truth for call-level timing and outcome. Fetched from the
//! calls source; `user_id` links the call to its operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished call as reported by the calls source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    /// Unique call identifier
    pub id: i64,

    /// Outcome code, open set ("COMPLETED", "NO_ANSWER", ...)
    pub status: String,

    /// Call start timestamp
    pub started_at: DateTime<Utc>,

    /// Call end timestamp; records without one are calls still in progress
    /// and never reach the pipeline
    pub finished_at: DateTime<Utc>,

    /// Caller number (ANI/CLI)
    pub caller_number: String,

    /// Called number (DNIS)
    pub callee_number: String,

    /// Owning user identifier, same namespace as `Operator::operator_id`
    pub user_id: i64,

    /// Opaque per-call context, passed through untouched
    #[serde(default)]
    pub context: serde_json::Value,
}

impl Call {
    /// Total call duration in whole seconds, never negative
    #[inline]
    pub fn duration_sec(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn call_at(start: &str, end: &str) -> Call {
        Call {
            id: 100,
            status: "COMPLETED".to_string(),
            started_at: start.parse().unwrap(),
            finished_at: end.parse().unwrap(),
            caller_number: "+79991112233".to_string(),
            callee_number: "54321".to_string(),
            user_id: 200,
            context: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_duration_sec() {
        let call = call_at("2024-06-18T12:00:00Z", "2024-06-18T12:05:00Z");
        assert_eq!(call.duration_sec(), 300);
    }

    #[test]
    fn test_duration_never_negative() {
        // A source with skewed clocks must not produce negative durations
        let call = call_at("2024-06-18T12:05:00Z", "2024-06-18T12:00:00Z");
        assert_eq!(call.duration_sec(), 0);
    }

    #[test]
    fn test_deserialize_without_context() {
        let call: Call = serde_json::from_value(serde_json::json!({
            "id": 100,
            "status": "COMPLETED",
            "started_at": "2024-06-18T12:00:00Z",
            "finished_at": "2024-06-18T12:05:00Z",
            "caller_number": "+79991112233",
            "callee_number": "54321",
            "user_id": 200,
        }))
        .unwrap();

        assert_eq!(call.id, 100);
        assert_eq!(call.user_id, 200);
        assert!(call.context.is_null());
        assert_eq!(
            call.started_at,
            Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_deserialize_rejects_unfinished_call() {
        let result = serde_json::from_value::<Call>(serde_json::json!({
            "id": 101,
            "status": "IN_PROGRESS",
            "started_at": "2024-06-18T12:00:00Z",
            "caller_number": "+79991110000",
            "callee_number": "12345",
            "user_id": 201,
        }));

        assert!(result.is_err());
    }
}
