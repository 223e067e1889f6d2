//! Persisted plan record definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One completed generation as held by the plan store.
///
/// `id` and `generated_at` never change after insert. `email` is the only
/// field written afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRecord {
    /// Store-assigned identifier
    pub id: u64,

    /// Assistant configuration the job ran against
    pub assistant_id: String,

    /// Remote conversation the result was read from
    pub thread_id: String,

    /// Prompt exactly as submitted
    pub prompt: String,

    /// Transformed plan text
    pub plan_text: String,

    /// Insert time (UTC)
    pub generated_at: Timestamp,

    /// Delivery address, absent until attached
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a successful generation: the plan text and the id of the record
/// holding it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedPlan {
    pub plan_text: String,
    pub record_id: u64,
}
