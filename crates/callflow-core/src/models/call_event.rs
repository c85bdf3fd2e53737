//! Call event model

use serde::{Deserialize, Serialize};

/// An event recorded against a call
///
/// A call has zero, one, or many events; only the distinct set of event
/// types is reported downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    /// Unique event identifier
    pub event_id: i64,

    /// Owning call identifier
    pub call_id: i64,

    /// Event type ("start", "answered", "hangup", ...)
    pub event_type: String,

    /// Opaque event payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_payload() {
        let event: CallEvent = serde_json::from_value(serde_json::json!({
            "event_id": 1,
            "call_id": 100,
            "event_type": "start",
            "payload": {"channel": "sip/1001"},
        }))
        .unwrap();

        assert_eq!(event.call_id, 100);
        assert_eq!(event.event_type, "start");
        assert_eq!(event.payload["channel"], "sip/1001");
    }
}
