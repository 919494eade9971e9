//! Storage trait abstraction.

use async_trait::async_trait;
use agrilearn_core::{LearningPlan, PlanId, PlanProgress};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Repository for learning plans and their step progress.
///
/// Records are scoped per plan id. Backends are injected into the plan
/// service rather than reached through ambient state.
#[async_trait]
pub trait PlanStore: Send + Sync {
    // === Plan operations ===

    /// Save a plan (create or update).
    async fn save_plan(&mut self, plan: &LearningPlan) -> Result<()>;

    /// Load a plan by ID.
    async fn load_plan(&self, id: PlanId) -> Result<Option<LearningPlan>>;

    /// List all plans, oldest first.
    async fn list_plans(&self) -> Result<Vec<LearningPlan>>;

    /// Delete a plan together with its progress. Missing plans are ignored.
    async fn delete_plan(&mut self, id: PlanId) -> Result<()>;

    // === Progress operations ===

    /// Save the step progress of a plan.
    async fn save_progress(&mut self, id: PlanId, progress: &PlanProgress) -> Result<()>;

    /// Load the step progress of a plan, if any was recorded.
    async fn load_progress(&self, id: PlanId) -> Result<Option<PlanProgress>>;
}
