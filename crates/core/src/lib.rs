//! Agrilearn core data models.
//!
//! Learning plans, their steps, authoring drafts and the persisted
//! step-progress record shared by the storage and progress crates.

#![warn(missing_docs)]

mod id;
mod plan;
mod draft;
mod progress;

pub use id::PlanId;
pub use plan::{LearningPlan, Step, Category};
pub use draft::{PlanDraft, PlanError};
pub use progress::PlanProgress;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
