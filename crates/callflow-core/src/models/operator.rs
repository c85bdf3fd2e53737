//! Operator model

use serde::{Deserialize, Serialize};

/// An operator as reported by the operators source
///
/// Looked up by a call's `user_id`; both identifiers share one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// Unique operator identifier
    pub operator_id: i64,

    /// Display name
    pub name: String,

    /// PBX extension
    pub extension: String,

    /// Contact email
    pub email: String,
}
