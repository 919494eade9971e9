//! Learning plan progress.
//!
//! `ProgressTracker` enforces sequential step completion for one plan;
//! `PlanService` loads plans and progress from a `PlanStore`, drives the
//! tracker and writes the results back.

#![warn(missing_docs)]

pub mod tracker;
pub mod service;

pub use tracker::{ProgressTracker, ProgressUpdate, ProgressError, StepState, SeedPolicy, progress_percent};
pub use service::{PlanService, PlanView, ServiceConfig, ServiceError};
