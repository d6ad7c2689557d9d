//! Task dispatch: encode -> forward -> decode per prediction task
//!
//! One handler per task, all funneled through the same normalization
//! boundary: no error ever escapes a `predict_*` call. A missing model, a
//! bad input, or a failed forward pass all come back as an Error-status
//! `PredictionResult`.

mod admet;
mod ddi;
pub mod decode;
mod dta;
mod dti;
pub mod result;
mod similarity;

#[cfg(test)]
mod tests;

pub use admet::{AdmetScaling, KNOWN_PROPERTIES};
pub use dta::{AFFINITY_MAX, AFFINITY_MIN, DTA_CONFIDENCE};

use crate::cache::{LoadedModel, ModelCache};
use crate::corpus::CandidateCorpus;
use crate::encoder::{MoleculeTokenizer, SequenceTokenizer};
use crate::error::EngineResult;
use crate::models::{
    AdmetRequest, DrugPairRequest, PredictionResult, SimilarityRequest, TargetPredictionRequest,
    TaskType,
};
use crate::observability::EngineMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Dispatches prediction requests to per-task handlers
pub struct TaskDispatcher {
    cache: Arc<ModelCache>,
    molecules: MoleculeTokenizer,
    sequences: SequenceTokenizer,
    corpus: Arc<dyn CandidateCorpus>,
    scaling: AdmetScaling,
    metrics: EngineMetrics,
}

impl TaskDispatcher {
    pub fn new(cache: Arc<ModelCache>, corpus: Arc<dyn CandidateCorpus>) -> Self {
        Self {
            cache,
            molecules: MoleculeTokenizer::new(),
            sequences: SequenceTokenizer::new(),
            corpus,
            scaling: AdmetScaling::default(),
            metrics: EngineMetrics::new(),
        }
    }

    /// Override the ADMET rescaling constants
    pub fn with_scaling(mut self, scaling: AdmetScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub async fn predict_dti(&self, req: &TargetPredictionRequest) -> PredictionResult {
        let Some(model) = self.lookup(TaskType::Dti).await else {
            return result::no_model(TaskType::Dti);
        };
        let start = Instant::now();
        let outcome = dti::run(&model, req, &self.molecules, &self.sequences);
        self.normalize(TaskType::Dti, &model, outcome, start)
    }

    pub async fn predict_dta(&self, req: &TargetPredictionRequest) -> PredictionResult {
        let Some(model) = self.lookup(TaskType::Dta).await else {
            return result::no_model(TaskType::Dta);
        };
        let start = Instant::now();
        let outcome = dta::run(&model, req, &self.molecules, &self.sequences);
        self.normalize(TaskType::Dta, &model, outcome, start)
    }

    pub async fn predict_ddi(&self, req: &DrugPairRequest) -> PredictionResult {
        let Some(model) = self.lookup(TaskType::Ddi).await else {
            return result::no_model(TaskType::Ddi);
        };
        let start = Instant::now();
        let outcome = ddi::run(&model, req, &self.molecules);
        self.normalize(TaskType::Ddi, &model, outcome, start)
    }

    pub async fn predict_admet(&self, req: &AdmetRequest) -> PredictionResult {
        let Some(model) = self.lookup(TaskType::Admet).await else {
            return result::no_model(TaskType::Admet);
        };
        let start = Instant::now();
        let outcome = admet::run(&model, req, &self.molecules, &self.scaling);
        self.normalize(TaskType::Admet, &model, outcome, start)
    }

    pub async fn predict_similarity(&self, req: &SimilarityRequest) -> PredictionResult {
        let Some(model) = self.lookup(TaskType::Similarity).await else {
            return result::no_model(TaskType::Similarity);
        };
        let start = Instant::now();
        let outcome = similarity::run(&model, req, &self.molecules, self.corpus.as_ref());
        self.normalize(TaskType::Similarity, &model, outcome, start)
    }

    async fn lookup(&self, task: TaskType) -> Option<Arc<LoadedModel>> {
        let model = self.cache.get_for_task(task).await;
        if model.is_none() {
            self.metrics.inc_prediction(task, "no_model");
        }
        model
    }

    /// The single error-normalization boundary: handler failures become
    /// Error-status results, never panics or raw errors.
    fn normalize(
        &self,
        task: TaskType,
        model: &LoadedModel,
        outcome: EngineResult<PredictionResult>,
        start: Instant,
    ) -> PredictionResult {
        self.metrics
            .observe_inference_latency(task, start.elapsed().as_secs_f64());
        match outcome {
            Ok(result) => {
                self.metrics.inc_prediction(task, "success");
                result
            }
            Err(e) => {
                warn!(task = %task, model = %model.key, error = %e, "Prediction failed");
                self.metrics.inc_prediction(task, "error");
                result::ResultBuilder::new(&model.key.model_name).error(e.to_string())
            }
        }
    }
}
