//! External CDR record model
//!
//! The external-sink projection of a completed call, delivered to the
//! remote webhook as part of one batch POST.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External CDR record
///
/// Produced only for calls that pass the external completeness gate.
/// `wait_sec`/`talk_sec` are None exactly when the call's connection was
/// never answered; they serialize as JSON nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCdrRecord {
    /// Call identifier, rendered as text
    pub call_id: String,

    /// Call start timestamp
    pub call_start: DateTime<Utc>,

    /// Call end timestamp
    pub call_end: DateTime<Utc>,

    /// Caller number
    pub caller_number: String,

    /// Operator identifier, rendered as text
    pub operator_id: String,

    /// Operator display name
    pub operator_name: String,

    /// "ANSWERED" when the connection was answered, otherwise the call
    /// status code verbatim
    pub agent_status: String,

    /// Seconds from connection initiation to answer
    pub wait_sec: Option<i64>,

    /// Seconds from answer to connection finish
    pub talk_sec: Option<i64>,

    /// Outcome code, verbatim from the call status
    pub end_reason: String,
}

impl ExternalCdrRecord {
    /// Agent status value for answered calls
    pub const ANSWERED: &'static str = "ANSWERED";
}
