//! Plan authoring input and validation.

use serde::{Deserialize, Serialize};
use crate::id::PlanId;
use crate::plan::{Category, LearningPlan, Step};
use crate::Time;

/// Errors raised while validating plan input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Plan title is blank
    #[error("plan title must not be empty")]
    EmptyTitle,

    /// A plan needs at least one step
    #[error("a learning plan needs at least one step")]
    NoSteps,

    /// A step has no title
    #[error("step {} has no title", .index + 1)]
    UntitledStep {
        /// Zero-based step index
        index: usize,
    },

    /// Category string did not match a known category
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Editable fields of a plan, as submitted by the plan form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    /// Plan title
    pub title: String,

    /// Topic category
    pub category: Category,

    /// Free-form duration
    pub duration: String,

    /// Learning outcomes
    #[serde(default)]
    pub what_youll_learn: Vec<String>,

    /// Ordered steps
    pub steps: Vec<Step>,

    /// Plan-level image references
    #[serde(default)]
    pub images: Vec<String>,
}

impl PlanDraft {
    /// Start a draft with a title and category and no steps.
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            category,
            duration: String::new(),
            what_youll_learn: Vec::new(),
            steps: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    /// Append a step.
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a learning outcome.
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.what_youll_learn.push(outcome.into());
        self
    }

    /// Check the draft can become a plan.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.title.trim().is_empty() {
            return Err(PlanError::EmptyTitle);
        }
        if self.steps.is_empty() {
            return Err(PlanError::NoSteps);
        }
        if let Some(index) = self.steps.iter().position(|s| s.title.trim().is_empty()) {
            return Err(PlanError::UntitledStep { index });
        }
        Ok(())
    }

    /// Trim text fields and drop blank learning outcomes.
    fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.duration = self.duration.trim().to_string();
        self.what_youll_learn = self
            .what_youll_learn
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        for step in &mut self.steps {
            step.title = step.title.trim().to_string();
        }
        self
    }

    /// Validate and turn the draft into a new plan with zero progress.
    pub fn into_plan(self, author: impl Into<String>, now: Time) -> Result<LearningPlan, PlanError> {
        self.validate()?;
        let draft = self.normalized();
        Ok(LearningPlan {
            id: PlanId::new(),
            title: draft.title,
            category: draft.category,
            duration: draft.duration,
            what_youll_learn: draft.what_youll_learn,
            steps: draft.steps,
            images: draft.images,
            author: author.into(),
            progress: 0,
            finished: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate and overwrite the editable fields of an existing plan.
    ///
    /// Identity, author, creation time and progress fields are left alone;
    /// the caller re-derives progress when the step count changes.
    pub fn apply_to(self, plan: &mut LearningPlan, now: Time) -> Result<(), PlanError> {
        self.validate()?;
        let draft = self.normalized();
        plan.title = draft.title;
        plan.category = draft.category;
        plan.duration = draft.duration;
        plan.what_youll_learn = draft.what_youll_learn;
        plan.steps = draft.steps;
        plan.images = draft.images;
        plan.updated_at = now;
        Ok(())
    }
}

impl From<&LearningPlan> for PlanDraft {
    fn from(plan: &LearningPlan) -> Self {
        Self {
            title: plan.title.clone(),
            category: plan.category,
            duration: plan.duration.clone(),
            what_youll_learn: plan.what_youll_learn.clone(),
            steps: plan.steps.clone(),
            images: plan.images.clone(),
        }
    }
}
