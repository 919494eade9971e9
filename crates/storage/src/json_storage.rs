//! JSON file storage implementation.
//!
//! Stores each plan as `plans/<id>.json` and its step progress as
//! `progress/<id>.json` below a root directory.

use std::path::{Path, PathBuf};
use agrilearn_core::{LearningPlan, PlanId, PlanProgress};
use super::{PlanStore, Result};
use tokio::fs;
use tracing::debug;

/// File-based JSON storage backend.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the data directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("plans")).await?;
        fs::create_dir_all(root.join("progress")).await?;

        debug!("Opened plan storage at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plan_path(&self, id: PlanId) -> PathBuf {
        self.root.join("plans").join(format!("{}.json", id))
    }

    fn progress_path(&self, id: PlanId) -> PathBuf {
        self.root.join("progress").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl PlanStore for JsonStorage {
    async fn save_plan(&mut self, plan: &LearningPlan) -> Result<()> {
        let json = serde_json::to_string_pretty(plan)?;
        fs::write(self.plan_path(plan.id), json.as_bytes()).await?;
        debug!("Saved plan {}", plan.id);
        Ok(())
    }

    async fn load_plan(&self, id: PlanId) -> Result<Option<LearningPlan>> {
        read_json(&self.plan_path(id)).await
    }

    async fn list_plans(&self) -> Result<Vec<LearningPlan>> {
        let mut plans: Vec<LearningPlan> = list_dir(&self.root.join("plans")).await?;
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn delete_plan(&mut self, id: PlanId) -> Result<()> {
        remove_if_exists(&self.plan_path(id)).await?;
        remove_if_exists(&self.progress_path(id)).await?;
        debug!("Deleted plan {}", id);
        Ok(())
    }

    async fn save_progress(&mut self, id: PlanId, progress: &PlanProgress) -> Result<()> {
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(self.progress_path(id), json.as_bytes()).await?;
        Ok(())
    }

    async fn load_progress(&self, id: PlanId) -> Result<Option<PlanProgress>> {
        read_json(&self.progress_path(id)).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping unreadable {}: {}", entry.path().display(), e),
        }
    }
    Ok(items)
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}
