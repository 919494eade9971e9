//! Sequential step completion for a single learning plan.
//!
//! A step can only be completed once the step before it is complete, and
//! un-completing a step re-locks every step after it. The status vector
//! therefore always has the shape `[true, .., true, false, .., false]`.

use serde::{Deserialize, Serialize};

/// Rejections from tracker operations. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    /// Tried to complete a step while the one before it is incomplete
    #[error("Please complete the previous step first (step {} is locked)", .index + 1)]
    PreviousStepIncomplete {
        /// Zero-based index of the rejected step
        index: usize,
    },

    /// Tried to finish a plan with outstanding steps
    #[error("Please complete all steps before marking the plan as finished ({remaining} remaining)")]
    PlanIncomplete {
        /// Steps still incomplete
        remaining: usize,
    },

    /// Step index outside the plan
    #[error("step {} does not exist (plan has {} steps)", .index + 1, .len)]
    StepOutOfRange {
        /// Zero-based index that was requested
        index: usize,
        /// Number of steps in the plan
        len: usize,
    },

    /// A tracker needs at least one step
    #[error("a learning plan needs at least one step")]
    NoSteps,
}

/// How the first step starts when no progress has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// First step unlocked but not completed (0% progress)
    #[default]
    FirstAvailable,
    /// First step already marked completed
    FirstCompleted,
}

impl SeedPolicy {
    /// Command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedPolicy::FirstAvailable => "first-available",
            SeedPolicy::FirstCompleted => "first-completed",
        }
    }
}

impl std::fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SeedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-available" | "available" => Ok(SeedPolicy::FirstAvailable),
            "first-completed" | "completed" => Ok(SeedPolicy::FirstCompleted),
            other => Err(format!("unknown seed policy: {other}")),
        }
    }
}

/// Derived per-step state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepState {
    /// Previous step incomplete
    Locked,
    /// Previous step complete (or first step), this one not
    Available,
    /// Completed
    Completed,
}

impl StepState {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Locked => "Locked",
            StepState::Available => "Available",
            StepState::Completed => "Completed",
        }
    }
}

/// Result of an accepted operation, to be persisted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Step flags after the operation
    pub status: Vec<bool>,
    /// Completion percentage after the operation
    pub progress: u8,
    /// Plan-level finished marker
    pub finished: bool,
}

/// `round(100 * completed / total)`, halves rounded up.
///
/// Returns 0 for an empty plan.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

/// Step completion state machine for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    status: Vec<bool>,
    finished: bool,
}

impl ProgressTracker {
    /// Fresh tracker for a plan with `step_count` steps.
    pub fn new(step_count: usize, seed: SeedPolicy) -> Result<Self, ProgressError> {
        if step_count == 0 {
            return Err(ProgressError::NoSteps);
        }
        let mut status = vec![false; step_count];
        status[0] = seed == SeedPolicy::FirstCompleted;
        Ok(Self { status, finished: false })
    }

    /// Rebuild a tracker from persisted flags.
    ///
    /// The saved flags are fitted to `step_count` (the plan may have been
    /// edited since) and anything after the first incomplete step is
    /// cleared. A finished marker only survives if every step is complete.
    pub fn restore(step_count: usize, saved: &[bool], finished: bool) -> Result<Self, ProgressError> {
        if step_count == 0 {
            return Err(ProgressError::NoSteps);
        }
        let mut status = saved.to_vec();
        status.resize(step_count, false);
        if let Some(gap) = status.iter().position(|done| !done) {
            status[gap..].iter_mut().for_each(|s| *s = false);
        }
        let finished = finished && status.iter().all(|s| *s);
        Ok(Self { status, finished })
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Always false; a tracker has at least one step.
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// Step flags in step order.
    pub fn status(&self) -> &[bool] {
        &self.status
    }

    /// Number of completed steps.
    pub fn completed_count(&self) -> usize {
        self.status.iter().filter(|s| **s).count()
    }

    /// Whether every step is complete.
    pub fn all_completed(&self) -> bool {
        self.status.iter().all(|s| *s)
    }

    /// Derived completion percentage.
    pub fn progress(&self) -> u8 {
        if self.finished {
            return 100;
        }
        progress_percent(self.completed_count(), self.len())
    }

    /// Whether the plan has been finished.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// State of one step, or `None` when out of range.
    pub fn step_state(&self, index: usize) -> Option<StepState> {
        let done = *self.status.get(index)?;
        Some(if done {
            StepState::Completed
        } else if index == 0 || self.status[index - 1] {
            StepState::Available
        } else {
            StepState::Locked
        })
    }

    /// States of all steps.
    pub fn states(&self) -> Vec<StepState> {
        (0..self.len()).filter_map(|i| self.step_state(i)).collect()
    }

    /// The step the learner can work on next.
    pub fn next_available(&self) -> Option<usize> {
        self.status.iter().position(|done| !done)
    }

    /// Mark a step complete. Completing a completed step changes nothing.
    pub fn complete_step(&mut self, index: usize) -> Result<ProgressUpdate, ProgressError> {
        self.check_index(index)?;
        self.check_unlocked(index)?;
        self.status[index] = true;
        Ok(self.update())
    }

    /// Mark a step incomplete and re-lock every later step.
    ///
    /// Clears the finished marker.
    pub fn uncomplete_step(&mut self, index: usize) -> Result<ProgressUpdate, ProgressError> {
        self.check_index(index)?;
        self.status[index..].iter_mut().for_each(|s| *s = false);
        self.finished = false;
        Ok(self.update())
    }

    /// Flip a step: complete it if incomplete, otherwise un-complete it.
    ///
    /// Calling this repeatedly on the same unlocked step alternates between
    /// the two.
    pub fn toggle_step(&mut self, index: usize) -> Result<ProgressUpdate, ProgressError> {
        self.check_index(index)?;
        self.check_unlocked(index)?;
        if self.status[index] {
            self.uncomplete_step(index)
        } else {
            self.complete_step(index)
        }
    }

    /// Mark the whole plan finished. Requires every step complete.
    pub fn finish_plan(&mut self) -> Result<ProgressUpdate, ProgressError> {
        let remaining = self.len() - self.completed_count();
        if remaining > 0 {
            return Err(ProgressError::PlanIncomplete { remaining });
        }
        self.finished = true;
        Ok(self.update())
    }

    fn check_index(&self, index: usize) -> Result<(), ProgressError> {
        if index >= self.len() {
            return Err(ProgressError::StepOutOfRange { index, len: self.len() });
        }
        Ok(())
    }

    fn check_unlocked(&self, index: usize) -> Result<(), ProgressError> {
        if index > 0 && !self.status[index - 1] {
            return Err(ProgressError::PreviousStepIncomplete { index });
        }
        Ok(())
    }

    fn update(&self) -> ProgressUpdate {
        ProgressUpdate {
            status: self.status.clone(),
            progress: self.progress(),
            finished: self.finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    fn tracker(status: &[bool]) -> ProgressTracker {
        ProgressTracker::restore(status.len(), status, false).unwrap()
    }

    fn is_sequential(status: &[bool]) -> bool {
        status.windows(2).all(|w| w[0] || !w[1])
    }

    #[test]
    fn test_progress_percent_rounding() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn test_new_seeds_first_step() {
        let available = ProgressTracker::new(3, SeedPolicy::FirstAvailable).unwrap();
        assert_eq!(available.status(), &[F, F, F]);
        assert_eq!(available.progress(), 0);
        assert_eq!(
            available.states(),
            vec![StepState::Available, StepState::Locked, StepState::Locked]
        );

        let completed = ProgressTracker::new(3, SeedPolicy::FirstCompleted).unwrap();
        assert_eq!(completed.status(), &[T, F, F]);
        assert_eq!(completed.progress(), 33);
        assert_eq!(
            completed.states(),
            vec![StepState::Completed, StepState::Available, StepState::Locked]
        );
    }

    #[test]
    fn test_new_rejects_empty_plan() {
        assert_eq!(ProgressTracker::new(0, SeedPolicy::default()), Err(ProgressError::NoSteps));
        assert_eq!(ProgressTracker::restore(0, &[], false), Err(ProgressError::NoSteps));
    }

    #[test]
    fn test_complete_in_order() {
        let mut t = ProgressTracker::new(3, SeedPolicy::FirstAvailable).unwrap();

        let update = t.complete_step(0).unwrap();
        assert_eq!(update.status, vec![T, F, F]);
        assert_eq!(update.progress, 33);

        let update = t.complete_step(1).unwrap();
        assert_eq!(update.status, vec![T, T, F]);
        assert_eq!(update.progress, 67);
        assert_eq!(t.next_available(), Some(2));
    }

    #[test]
    fn test_complete_out_of_order_is_rejected_without_mutation() {
        let mut t = tracker(&[T, F, F, F]);
        let before = t.clone();

        assert_eq!(
            t.complete_step(2),
            Err(ProgressError::PreviousStepIncomplete { index: 2 })
        );
        assert_eq!(
            t.toggle_step(3),
            Err(ProgressError::PreviousStepIncomplete { index: 3 })
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_uncomplete_cascades_forward() {
        let mut t = tracker(&[T, T, T, F]);
        let update = t.uncomplete_step(1).unwrap();
        assert_eq!(update.status, vec![T, F, F, F]);
        assert_eq!(update.progress, 25);

        let mut t = tracker(&[T, T, T, F]);
        let update = t.toggle_step(1).unwrap();
        assert_eq!(update.status, vec![T, F, F, F]);
    }

    #[test]
    fn test_cannot_skip_after_uncompleting() {
        let mut t = tracker(&[T, T, T, T, F]);
        t.uncomplete_step(2).unwrap();
        assert_eq!(
            t.complete_step(4),
            Err(ProgressError::PreviousStepIncomplete { index: 4 })
        );
        t.complete_step(2).unwrap();
        t.complete_step(3).unwrap();
        t.complete_step(4).unwrap();
        assert!(t.all_completed());
    }

    #[test]
    fn test_toggle_alternates() {
        let mut t = ProgressTracker::new(2, SeedPolicy::FirstAvailable).unwrap();
        assert_eq!(t.toggle_step(0).unwrap().status, vec![T, F]);
        assert_eq!(t.toggle_step(0).unwrap().status, vec![F, F]);
        assert_eq!(t.toggle_step(0).unwrap().status, vec![T, F]);
        assert_eq!(t.toggle_step(0).unwrap().status, vec![F, F]);
    }

    #[test]
    fn test_explicit_operations_are_idempotent() {
        let mut t = ProgressTracker::new(2, SeedPolicy::FirstAvailable).unwrap();
        let first = t.complete_step(0).unwrap();
        let second = t.complete_step(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.status, vec![T, F]);

        let first = t.uncomplete_step(1).unwrap();
        let second = t.uncomplete_step(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.status, vec![T, F]);
    }

    #[test]
    fn test_out_of_range() {
        let mut t = tracker(&[T, F]);
        let before = t.clone();
        let err = ProgressError::StepOutOfRange { index: 2, len: 2 };
        assert_eq!(t.complete_step(2), Err(err.clone()));
        assert_eq!(t.uncomplete_step(2), Err(err.clone()));
        assert_eq!(t.toggle_step(2), Err(err));
        assert_eq!(t.step_state(2), None);
        assert_eq!(t, before);
    }

    #[test]
    fn test_finish_requires_all_steps() {
        let mut t = tracker(&[T, T, F]);
        assert_eq!(t.finish_plan(), Err(ProgressError::PlanIncomplete { remaining: 1 }));
        assert!(!t.is_finished());

        t.complete_step(2).unwrap();
        let update = t.finish_plan().unwrap();
        assert!(update.finished);
        assert_eq!(update.progress, 100);

        // Finishing twice is fine
        assert_eq!(t.finish_plan().unwrap(), update);
    }

    #[test]
    fn test_uncomplete_clears_finished() {
        let mut t = tracker(&[T, T, T]);
        t.finish_plan().unwrap();

        let update = t.uncomplete_step(2).unwrap();
        assert!(!update.finished);
        assert_eq!(update.progress, 67);

        // Completing again does not re-finish on its own
        let update = t.complete_step(2).unwrap();
        assert!(!update.finished);
        assert_eq!(update.progress, 100);
    }

    #[test]
    fn test_restore_reconciles_saved_flags() {
        let t = ProgressTracker::restore(3, &[T, F, T], false).unwrap();
        assert_eq!(t.status(), &[T, F, F]);

        let t = ProgressTracker::restore(4, &[T, T], false).unwrap();
        assert_eq!(t.status(), &[T, T, F, F]);

        let t = ProgressTracker::restore(2, &[T, T, T], true).unwrap();
        assert_eq!(t.status(), &[T, T]);
        assert!(t.is_finished());

        let t = ProgressTracker::restore(3, &[T, T], true).unwrap();
        assert!(!t.is_finished());
    }

    #[test]
    fn test_invariant_holds_over_operation_sequence() {
        let mut t = ProgressTracker::new(5, SeedPolicy::FirstAvailable).unwrap();
        // Deterministic pseudo-random walk over operations and indices
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let index = (seed >> 16) as usize % 6;
            let before = t.clone();
            let result = match (seed >> 8) % 3 {
                0 => t.toggle_step(index),
                1 => t.complete_step(index),
                _ => t.uncomplete_step(index),
            };
            if result.is_err() {
                assert_eq!(t, before);
            }
            assert!(is_sequential(t.status()));
            assert_eq!(t.progress(), progress_percent(t.completed_count(), t.len()));
        }
    }

    #[test]
    fn test_seed_policy_parse() {
        assert_eq!("first-completed".parse::<SeedPolicy>().unwrap(), SeedPolicy::FirstCompleted);
        assert_eq!("First-Available".parse::<SeedPolicy>().unwrap(), SeedPolicy::FirstAvailable);
        assert!("whatever".parse::<SeedPolicy>().is_err());
        assert_eq!(SeedPolicy::default().to_string(), "first-available");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ProgressError::PreviousStepIncomplete { index: 1 }.to_string(),
            "Please complete the previous step first (step 2 is locked)"
        );
        assert_eq!(
            ProgressError::PlanIncomplete { remaining: 2 }.to_string(),
            "Please complete all steps before marking the plan as finished (2 remaining)"
        );
    }
}
