//! Plan service - the collaborator that owns storage for the tracker.
//!
//! Loads a plan and its recorded step flags, runs one tracker operation,
//! then writes the new flags and the mirrored percentage back.

use chrono::Utc;
use tracing::{debug, info, warn};
use agrilearn_core::{LearningPlan, PlanDraft, PlanError, PlanId, PlanProgress, Step};
use agrilearn_storage::{PlanStore, StorageError};
use crate::tracker::{ProgressError, ProgressTracker, ProgressUpdate, SeedPolicy, StepState};

/// Errors surfaced by the plan service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No plan with this id
    #[error("plan not found: {0}")]
    PlanNotFound(PlanId),

    /// Invalid plan input
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Tracker rejected the operation
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Storage backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Service configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceConfig {
    /// Initial state of the first step for plans without recorded progress
    pub seed: SeedPolicy,
}

/// A plan together with its live tracker, as shown on the plan detail view.
#[derive(Debug, Clone)]
pub struct PlanView {
    /// The plan record
    pub plan: LearningPlan,
    /// Step progress for the plan
    pub tracker: ProgressTracker,
}

impl PlanView {
    /// Steps paired with their derived state.
    pub fn steps(&self) -> impl Iterator<Item = (usize, &Step, StepState)> + '_ {
        self.plan
            .steps
            .iter()
            .enumerate()
            .filter_map(|(i, step)| self.tracker.step_state(i).map(|state| (i, step, state)))
    }
}

/// Learning plan authoring and progress service.
pub struct PlanService<S: PlanStore> {
    store: S,
    config: ServiceConfig,
}

impl<S: PlanStore> PlanService<S> {
    /// Create a new plan service.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ServiceConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // === Authoring ===

    /// Validate a draft and save it as a new plan.
    ///
    /// The seeded step flags are recorded with the plan, so later services
    /// configured with a different seed see the same progress.
    pub async fn create_plan(
        &mut self,
        draft: PlanDraft,
        author: impl Into<String>,
    ) -> Result<LearningPlan, ServiceError> {
        let mut plan = draft.into_plan(author, Utc::now())?;
        let tracker = ProgressTracker::new(plan.step_count(), self.config.seed)?;
        plan.progress = tracker.progress();

        let record = PlanProgress::new(tracker.status().to_vec(), false);
        self.store.save_progress(plan.id, &record).await?;
        self.store.save_plan(&plan).await?;
        info!("Created plan {} - {}", plan.id, plan.title);
        Ok(plan)
    }

    /// Replace the editable fields of a plan.
    ///
    /// Recorded progress is fitted to the new step list and the plan's
    /// percentage is recomputed.
    pub async fn update_plan(&mut self, id: PlanId, draft: PlanDraft) -> Result<LearningPlan, ServiceError> {
        let mut plan = self.get_plan(id).await?;
        draft.apply_to(&mut plan, Utc::now())?;

        let saved = self.store.load_progress(id).await?;
        let tracker = self.tracker_for(&plan, saved.as_ref())?;
        if saved.is_some() {
            let record = PlanProgress::new(tracker.status().to_vec(), tracker.is_finished());
            self.store.save_progress(id, &record).await?;
        }
        plan.progress = tracker.progress();
        plan.finished = tracker.is_finished();

        self.store.save_plan(&plan).await?;
        info!("Updated plan {} ({} steps)", plan.id, plan.step_count());
        Ok(plan)
    }

    /// Delete a plan and its progress.
    pub async fn delete_plan(&mut self, id: PlanId) -> Result<(), ServiceError> {
        self.get_plan(id).await?;
        self.store.delete_plan(id).await?;
        info!("Deleted plan {}", id);
        Ok(())
    }

    /// Load a plan.
    pub async fn get_plan(&self, id: PlanId) -> Result<LearningPlan, ServiceError> {
        self.store
            .load_plan(id)
            .await?
            .ok_or(ServiceError::PlanNotFound(id))
    }

    /// All plans, oldest first.
    pub async fn list_plans(&self) -> Result<Vec<LearningPlan>, ServiceError> {
        Ok(self.store.list_plans().await?)
    }

    // === Progress ===

    /// Load a plan with its tracker.
    pub async fn open(&self, id: PlanId) -> Result<PlanView, ServiceError> {
        let plan = self.get_plan(id).await?;
        let saved = self.store.load_progress(id).await?;
        let tracker = self.tracker_for(&plan, saved.as_ref())?;
        Ok(PlanView { plan, tracker })
    }

    /// Flip one step of a plan.
    pub async fn toggle_step(&mut self, id: PlanId, index: usize) -> Result<ProgressUpdate, ServiceError> {
        self.apply(id, "toggle", |t| t.toggle_step(index)).await
    }

    /// Mark one step of a plan complete.
    pub async fn complete_step(&mut self, id: PlanId, index: usize) -> Result<ProgressUpdate, ServiceError> {
        self.apply(id, "complete", |t| t.complete_step(index)).await
    }

    /// Mark one step of a plan incomplete.
    pub async fn uncomplete_step(&mut self, id: PlanId, index: usize) -> Result<ProgressUpdate, ServiceError> {
        self.apply(id, "uncomplete", |t| t.uncomplete_step(index)).await
    }

    /// Finish a plan whose steps are all complete.
    pub async fn finish_plan(&mut self, id: PlanId) -> Result<ProgressUpdate, ServiceError> {
        self.apply(id, "finish", |t| t.finish_plan()).await
    }

    fn tracker_for(
        &self,
        plan: &LearningPlan,
        saved: Option<&PlanProgress>,
    ) -> Result<ProgressTracker, ProgressError> {
        match saved {
            Some(record) => ProgressTracker::restore(plan.step_count(), &record.status, record.finished),
            None => ProgressTracker::new(plan.step_count(), self.config.seed),
        }
    }

    /// Run one tracker operation and persist its outcome. Nothing is written
    /// when the tracker rejects the operation.
    ///
    /// The step flags are written first. If the plan write then fails, the
    /// error is returned and the plan's mirrored percentage lags the flags
    /// until the next accepted operation; `open` always reads the flags.
    async fn apply<F>(&mut self, id: PlanId, action: &str, op: F) -> Result<ProgressUpdate, ServiceError>
    where
        F: FnOnce(&mut ProgressTracker) -> Result<ProgressUpdate, ProgressError>,
    {
        let PlanView { mut plan, mut tracker } = self.open(id).await?;

        let update = match op(&mut tracker) {
            Ok(update) => update,
            Err(e) => {
                warn!("Rejected {} on plan {}: {}", action, id, e);
                return Err(e.into());
            }
        };

        let record = PlanProgress::new(update.status.clone(), update.finished);
        self.store.save_progress(id, &record).await?;

        plan.progress = update.progress;
        plan.finished = update.finished;
        plan.updated_at = record.updated_at;
        if let Err(e) = self.store.save_plan(&plan).await {
            warn!("Saved progress for plan {} but not its summary: {}", id, e);
            return Err(e.into());
        }

        debug!("Plan {} status after {}: {:?}", id, action, update.status);
        info!("Plan {} is {}% complete", id, update.progress);
        Ok(update)
    }
}
