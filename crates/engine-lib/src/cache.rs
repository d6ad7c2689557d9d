//! Model cache with task exclusivity and idle-time eviction
//!
//! Keyed by `(task, model name)`. At most one model may be loaded per task:
//! installing a new model atomically evicts the task's previous entry under
//! the same write lock, so concurrent `get` calls never observe a
//! half-unloaded entry. Entries idle longer than their TTL are removed by
//! `evict_expired`, which the engine runs on a periodic sweep and before
//! every load.

use crate::models::{LoadedModelSummary, ModelKey, ModelMetadata, TaskType};
use crate::shape::ModelBackend;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default idle TTL before a loaded model is eligible for eviction
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// A loaded model and everything needed to run and account for it
pub struct LoadedModel {
    pub key: ModelKey,
    pub backend: Box<dyn ModelBackend>,
    pub metadata: Option<ModelMetadata>,
    pub checksum: Option<String>,
    /// Scratch artifact backing this model, removed when the model drops
    pub artifact_path: Option<PathBuf>,
}

impl Drop for LoadedModel {
    fn drop(&mut self) {
        if let Some(path) = &self.artifact_path {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove model artifact"
                );
            }
        }
    }
}

struct CacheEntry {
    model: Arc<LoadedModel>,
    loaded_at: i64,
    last_used: i64,
}

/// Keyed store of loaded models
pub struct ModelCache {
    entries: RwLock<HashMap<ModelKey, CacheEntry>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a model by key, refreshing its last-used time
    pub async fn get(&self, task: TaskType, model_name: &str) -> Option<Arc<LoadedModel>> {
        let key = ModelKey::new(task, model_name);
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&key)?;
        entry.last_used = now_ts();
        Some(Arc::clone(&entry.model))
    }

    /// Look up the model loaded for a task, refreshing its last-used time
    ///
    /// Task exclusivity guarantees at most one entry per task.
    pub async fn get_for_task(&self, task: TaskType) -> Option<Arc<LoadedModel>> {
        let mut entries = self.entries.write().await;
        let entry = entries.values_mut().find(|e| e.model.key.task == task)?;
        entry.last_used = now_ts();
        Some(Arc::clone(&entry.model))
    }

    /// Refresh the last-used time of an entry if present
    pub async fn touch(&self, task: TaskType, model_name: &str) -> bool {
        let key = ModelKey::new(task, model_name);
        let mut entries = self.entries.write().await;
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.last_used = now_ts();
                true
            }
            None => false,
        }
    }

    /// Install a model, evicting any existing entry for the same task
    ///
    /// Eviction and insertion happen under one write lock so the
    /// single-active-model-per-task invariant holds at every observable
    /// point. Returns the keys that were evicted.
    pub async fn install(&self, model: LoadedModel) -> Vec<ModelKey> {
        let task = model.key.task;
        let key = model.key.clone();
        let mut entries = self.entries.write().await;

        let evicted: Vec<ModelKey> = entries
            .keys()
            .filter(|k| k.task == task)
            .cloned()
            .collect();
        for k in &evicted {
            entries.remove(k);
            info!(model = %k, "Evicted model for task exclusivity");
        }

        let now = now_ts();
        entries.insert(
            key.clone(),
            CacheEntry {
                model: Arc::new(model),
                loaded_at: now,
                last_used: now,
            },
        );
        info!(model = %key, "Model installed in cache");
        evicted
    }

    /// Unload one model; returns true if it was present
    pub async fn unload(&self, task: TaskType, model_name: &str) -> bool {
        let key = ModelKey::new(task, model_name);
        let removed = self.entries.write().await.remove(&key).is_some();
        if removed {
            info!(model = %key, "Model unloaded");
        }
        removed
    }

    /// Unload every model for a task; returns the number removed
    pub async fn unload_task(&self, task: TaskType) -> usize {
        let mut entries = self.entries.write().await;
        let keys: Vec<ModelKey> = entries
            .keys()
            .filter(|k| k.task == task)
            .cloned()
            .collect();
        for k in &keys {
            entries.remove(k);
        }
        keys.len()
    }

    /// Unload everything; returns the number removed
    pub async fn unload_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        if count > 0 {
            info!(count, "All models unloaded");
        }
        count
    }

    /// Summaries of every loaded model
    pub async fn list_loaded(&self) -> Vec<LoadedModelSummary> {
        let entries = self.entries.read().await;
        let mut summaries: Vec<LoadedModelSummary> = entries
            .values()
            .map(|e| LoadedModelSummary {
                task: e.model.key.task,
                model_name: e.model.key.model_name.clone(),
                shape: e.model.backend.shape().as_str().to_string(),
                checksum: e.model.checksum.clone(),
                loaded_at: e.loaded_at,
                last_used: e.last_used,
            })
            .collect();
        summaries.sort_by(|a, b| a.task.as_str().cmp(b.task.as_str()));
        summaries
    }

    /// Number of loaded models
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove entries idle longer than `ttl`; returns the number evicted
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let cutoff = now_ts() - ttl.as_secs() as i64;
        let mut entries = self.entries.write().await;
        let expired: Vec<ModelKey> = entries
            .iter()
            .filter(|(_, e)| e.last_used < cutoff)
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            entries.remove(k);
            info!(model = %k, "Evicted idle model");
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "TTL sweep complete");
        }
        expired.len()
    }

    /// Backdate an entry's last-used time (test hook for TTL eviction)
    #[cfg(test)]
    pub(crate) async fn backdate(&self, task: TaskType, model_name: &str, secs: i64) {
        let key = ModelKey::new(task, model_name);
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&key) {
            entry.last_used -= secs;
        }
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::stub_model;

    #[tokio::test]
    async fn test_install_and_get() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;

        assert!(cache.get(TaskType::Dti, "m1").await.is_some());
        assert!(cache.get(TaskType::Dti, "other").await.is_none());
        assert!(cache.get(TaskType::Dta, "m1").await.is_none());
    }

    #[tokio::test]
    async fn test_task_exclusivity() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;
        let evicted = cache.install(stub_model(TaskType::Dti, "m2")).await;

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].model_name, "m1");
        assert!(cache.get(TaskType::Dti, "m1").await.is_none());
        assert!(cache.get(TaskType::Dti, "m2").await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_tasks_are_independent() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;
        let evicted = cache.install(stub_model(TaskType::Dta, "m2")).await;

        assert!(evicted.is_empty());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_refreshes_last_used() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;
        cache.backdate(TaskType::Dti, "m1", 100).await;

        let before = cache.list_loaded().await[0].last_used;
        cache.get(TaskType::Dti, "m1").await;
        let after = cache.list_loaded().await[0].last_used;

        assert!(after >= before + 100);
    }

    #[tokio::test]
    async fn test_last_used_never_before_loaded_at() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Admet, "m1")).await;
        let summary = &cache.list_loaded().await[0];
        assert!(summary.last_used >= summary.loaded_at);
    }

    #[tokio::test]
    async fn test_ttl_eviction() {
        let ttl = Duration::from_secs(7200);
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "stale")).await;
        cache.install(stub_model(TaskType::Dta, "fresh")).await;
        cache
            .backdate(TaskType::Dti, "stale", ttl.as_secs() as i64 + 1)
            .await;

        let evicted = cache.evict_expired(ttl).await;

        assert_eq!(evicted, 1);
        assert!(cache.get(TaskType::Dti, "stale").await.is_none());
        assert!(cache.get(TaskType::Dta, "fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_unload_variants() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;
        cache.install(stub_model(TaskType::Dta, "m2")).await;
        cache.install(stub_model(TaskType::Ddi, "m3")).await;

        assert!(cache.unload(TaskType::Dti, "m1").await);
        assert!(!cache.unload(TaskType::Dti, "m1").await);
        assert_eq!(cache.unload_task(TaskType::Dta).await, 1);
        assert_eq!(cache.unload_all().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_for_task() {
        let cache = ModelCache::new();
        assert!(cache.get_for_task(TaskType::Similarity).await.is_none());

        cache.install(stub_model(TaskType::Similarity, "emb")).await;
        let model = cache.get_for_task(TaskType::Similarity).await.unwrap();
        assert_eq!(model.key.model_name, "emb");
    }

    #[tokio::test]
    async fn test_list_loaded_reports_shape() {
        let cache = ModelCache::new();
        cache.install(stub_model(TaskType::Dti, "m1")).await;
        let listed = cache.list_loaded().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].shape, "classification");
    }
}
