//! Model lifecycle: validate, fetch, instantiate, install
//!
//! A load walks the full pipeline in order: trust validation (no network
//! until it passes), metadata fetch (best effort), artifact download,
//! backend instantiation with per-task shape fallback, and cache
//! installation. Expired entries are swept before every load.

use crate::cache::{LoadedModel, ModelCache, DEFAULT_TTL};
use crate::encoder::{SEQUENCE_MAX_LEN, SMILES_MAX_LEN};
use crate::error::{EngineError, EngineResult};
use crate::health::{components, HealthRegistry};
use crate::hub::{is_trusted, ArtifactStore, MetadataFetcher};
use crate::models::{ModelKey, ModelMetadata, ModelSourceConfig, TaskType};
use crate::observability::EngineMetrics;
use crate::shape::{ModelBackend, ModelShape, TractBackend, DDI_LABELS};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Upper bound on one load attempt end to end
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds inference backends from downloaded weights
///
/// Seam between the lifecycle pipeline and the runtime, so the pipeline can
/// be exercised without real ONNX graphs.
pub trait BackendFactory: Send + Sync {
    fn build(
        &self,
        shape: ModelShape,
        bytes: &[u8],
        input_len: usize,
        labels: Vec<String>,
    ) -> EngineResult<Box<dyn ModelBackend>>;
}

/// Production factory backed by tract plans
pub struct TractFactory;

impl BackendFactory for TractFactory {
    fn build(
        &self,
        shape: ModelShape,
        bytes: &[u8],
        input_len: usize,
        labels: Vec<String>,
    ) -> EngineResult<Box<dyn ModelBackend>> {
        let backend = match shape {
            ModelShape::Classification => TractBackend::classification(bytes, input_len)?,
            ModelShape::Pipeline => TractBackend::pipeline(bytes, input_len, labels)?,
            ModelShape::Embedding => TractBackend::embedding(bytes, input_len)?,
            ModelShape::General => TractBackend::general(bytes, input_len)?,
        };
        Ok(Box::new(backend))
    }
}

/// Orchestrates model loads into the shared cache
pub struct ModelLoader {
    cache: Arc<ModelCache>,
    fetcher: MetadataFetcher,
    store: ArtifactStore,
    factory: Box<dyn BackendFactory>,
    metrics: EngineMetrics,
    health: Option<HealthRegistry>,
    ttl: Duration,
    load_timeout: Duration,
}

impl ModelLoader {
    pub fn new(cache: Arc<ModelCache>, fetcher: MetadataFetcher, store: ArtifactStore) -> Self {
        Self {
            cache,
            fetcher,
            store,
            factory: Box::new(TractFactory),
            metrics: EngineMetrics::new(),
            health: None,
            ttl: DEFAULT_TTL,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// Report hub outcomes to a health registry
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Override the idle TTL used by the pre-load sweep
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_factory(mut self, factory: Box<dyn BackendFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Load a model for a task, installing it into the cache
    ///
    /// Idempotent: a cache hit refreshes the entry and returns without
    /// touching the network. Untrusted paths are rejected before any
    /// network activity.
    pub async fn load(
        &self,
        task: TaskType,
        model_name: &str,
        config: &ModelSourceConfig,
    ) -> EngineResult<()> {
        let start = Instant::now();

        let expired = self.cache.evict_expired(self.ttl).await;
        if expired > 0 {
            for _ in 0..expired {
                self.metrics.inc_eviction("ttl");
            }
        }

        if self.cache.touch(task, model_name).await {
            info!(task = %task, model = %model_name, "Model already loaded");
            self.metrics.inc_model_load(task, "cached");
            return Ok(());
        }

        if !is_trusted(&config.path) {
            self.metrics.inc_model_load(task, "rejected");
            return Err(EngineError::Validation(format!(
                "Untrusted model source: {}",
                config.path
            )));
        }

        let result = tokio::time::timeout(self.load_timeout, self.load_inner(task, model_name, config))
            .await
            .unwrap_or_else(|_| {
                Err(EngineError::Load(format!(
                    "Load timed out after {:?}",
                    self.load_timeout
                )))
            });

        let elapsed = start.elapsed().as_secs_f64();
        self.metrics.observe_load_duration(task, elapsed);
        match &result {
            Ok(()) => {
                self.metrics.inc_model_load(task, "loaded");
                info!(
                    task = %task,
                    model = %model_name,
                    duration_secs = elapsed,
                    "Model loaded"
                );
            }
            Err(e) => {
                self.metrics.inc_model_load(task, "failed");
                warn!(task = %task, model = %model_name, error = %e, "Model load failed");
            }
        }
        result
    }

    async fn load_inner(
        &self,
        task: TaskType,
        model_name: &str,
        config: &ModelSourceConfig,
    ) -> EngineResult<()> {
        // Metadata informs shape selection but its absence never blocks a load
        let metadata = match self.fetcher.fetch(&config.path).await {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(model = %model_name, error = %e, "Metadata unavailable, proceeding");
                None
            }
        };

        let artifact = match self.store.download(&self.fetcher, &config.path).await {
            Ok(artifact) => {
                if let Some(health) = &self.health {
                    health.report_recovery(components::HUB).await;
                }
                artifact
            }
            Err(e) => {
                if let Some(health) = &self.health {
                    health.report_failure(components::HUB, e.to_string()).await;
                }
                return Err(e);
            }
        };

        let input_len = input_len_for(task);
        let backend = self.instantiate(task, &artifact.bytes, input_len, metadata.as_ref())?;

        let model = LoadedModel {
            key: ModelKey::new(task, model_name),
            backend,
            metadata,
            checksum: Some(artifact.checksum),
            artifact_path: Some(artifact.path),
        };

        let evicted = self.cache.install(model).await;
        for key in &evicted {
            info!(model = %key, "Displaced by new model for task");
            self.metrics.inc_eviction("task_exclusive");
        }
        self.metrics.set_models_loaded(self.cache.len().await as i64);
        Ok(())
    }

    /// Instantiate a backend with the task's preferred shape, falling back
    /// to the general renderer when the preferred graph does not fit
    fn instantiate(
        &self,
        task: TaskType,
        bytes: &[u8],
        input_len: usize,
        metadata: Option<&ModelMetadata>,
    ) -> EngineResult<Box<dyn ModelBackend>> {
        match task {
            TaskType::Dti | TaskType::Dta | TaskType::Ddi => {
                match self
                    .factory
                    .build(ModelShape::Classification, bytes, input_len, Vec::new())
                {
                    Ok(backend) => Ok(backend),
                    Err(e) => {
                        warn!(task = %task, error = %e, "Classification head rejected, using general shape");
                        self.factory
                            .build(ModelShape::General, bytes, input_len, Vec::new())
                    }
                }
            }
            TaskType::Admet => {
                let labels = pipeline_labels(metadata);
                match self
                    .factory
                    .build(ModelShape::Pipeline, bytes, input_len, labels)
                {
                    Ok(backend) => Ok(backend),
                    Err(e) => {
                        warn!(task = %task, error = %e, "Pipeline head rejected, using general shape");
                        self.factory
                            .build(ModelShape::General, bytes, input_len, Vec::new())
                    }
                }
            }
            // An embedding model with no embedding output is unusable
            TaskType::Similarity => {
                self.factory
                    .build(ModelShape::Embedding, bytes, input_len, Vec::new())
            }
        }
    }
}

/// Fixed encoder width per task
fn input_len_for(task: TaskType) -> usize {
    match task {
        TaskType::Dti | TaskType::Dta => SEQUENCE_MAX_LEN,
        TaskType::Ddi | TaskType::Admet | TaskType::Similarity => SMILES_MAX_LEN,
    }
}

/// Ordered label names from the hub config, with a conservative default
fn pipeline_labels(metadata: Option<&ModelMetadata>) -> Vec<String> {
    if let Some(meta) = metadata {
        if let Some(map) = meta.config.get("id2label").and_then(|v| v.as_object()) {
            let mut labels: Vec<(usize, String)> = map
                .iter()
                .filter_map(|(k, v)| {
                    let idx = k.parse::<usize>().ok()?;
                    Some((idx, v.as_str()?.to_string()))
                })
                .collect();
            if !labels.is_empty() {
                labels.sort_by_key(|(idx, _)| *idx);
                return labels.into_iter().map(|(_, label)| label).collect();
            }
        }
    }
    DDI_LABELS.iter().map(|s| s.to_string()).collect()
}
