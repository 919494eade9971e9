//! Persisted step progress for a single plan.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Step completion flags as written to storage, keyed by plan id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProgress {
    /// One flag per step, in step order
    pub status: Vec<bool>,

    /// Plan was explicitly finished
    #[serde(default)]
    pub finished: bool,

    /// Last write
    pub updated_at: Time,
}

impl PlanProgress {
    /// Create a record stamped with the current time.
    pub fn new(status: Vec<bool>, finished: bool) -> Self {
        Self {
            status,
            finished,
            updated_at: chrono::Utc::now(),
        }
    }
}
