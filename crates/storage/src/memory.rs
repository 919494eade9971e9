//! In-process storage backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use agrilearn_core::{LearningPlan, PlanId, PlanProgress};
use super::{PlanStore, Result, StorageError};

#[derive(Debug, Default)]
struct Inner {
    plans: HashMap<PlanId, LearningPlan>,
    progress: HashMap<PlanId, PlanProgress>,
}

/// Plan store kept in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Other(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PlanStore for MemoryStorage {
    async fn save_plan(&mut self, plan: &LearningPlan) -> Result<()> {
        self.lock()?.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn load_plan(&self, id: PlanId) -> Result<Option<LearningPlan>> {
        Ok(self.lock()?.plans.get(&id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<LearningPlan>> {
        let mut plans: Vec<_> = self.lock()?.plans.values().cloned().collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn delete_plan(&mut self, id: PlanId) -> Result<()> {
        let mut guard = self.lock()?;
        guard.plans.remove(&id);
        guard.progress.remove(&id);
        Ok(())
    }

    async fn save_progress(&mut self, id: PlanId, progress: &PlanProgress) -> Result<()> {
        self.lock()?.progress.insert(id, progress.clone());
        Ok(())
    }

    async fn load_progress(&self, id: PlanId) -> Result<Option<PlanProgress>> {
        Ok(self.lock()?.progress.get(&id).cloned())
    }
}
