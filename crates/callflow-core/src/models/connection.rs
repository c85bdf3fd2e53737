//! Connection model
//!
//! The leg of a call used for wait/talk timing. A call has zero or one
//! relevant connection; `answered_at` is absent for calls never answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A call connection as reported by the connections source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection identifier
    pub connection_id: i64,

    /// Owning call identifier
    pub call_id: i64,

    /// Connected phone number
    pub phone: String,

    /// When the connection was initiated
    pub initiated_at: DateTime<Utc>,

    /// When the connection was answered (None if never answered)
    pub answered_at: Option<DateTime<Utc>>,

    /// When the connection finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl Connection {
    /// Check if the connection was answered
    #[inline]
    pub fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }

    /// Seconds from initiation to answer; None when never answered
    pub fn wait_sec(&self) -> Option<i64> {
        self.answered_at
            .map(|answered| (answered - self.initiated_at).num_seconds().max(0))
    }
}
