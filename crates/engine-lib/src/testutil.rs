//! Shared test fixtures: stub backends standing in for tract plans

use crate::cache::LoadedModel;
use crate::encoder::EncodedInput;
use crate::error::{EngineError, EngineResult};
use crate::models::{ModelKey, TaskType};
use crate::shape::{ModelBackend, ModelOutput, ModelShape};

/// Backend returning a fixed output for every forward pass
pub(crate) struct StubBackend {
    pub shape: ModelShape,
    pub output: ModelOutput,
}

impl ModelBackend for StubBackend {
    fn forward(&self, _input: &EncodedInput) -> EngineResult<ModelOutput> {
        Ok(self.output.clone())
    }

    fn shape(&self) -> ModelShape {
        self.shape
    }
}

/// Backend whose forward pass always fails
pub(crate) struct FailingBackend;

impl ModelBackend for FailingBackend {
    fn forward(&self, _input: &EncodedInput) -> EngineResult<ModelOutput> {
        Err(EngineError::Inference("stub forward failure".to_string()))
    }

    fn shape(&self) -> ModelShape {
        ModelShape::Classification
    }
}

/// Classification-shaped stub model with fixed logits
pub(crate) fn stub_model(task: TaskType, name: &str) -> LoadedModel {
    stub_model_with(
        task,
        name,
        ModelShape::Classification,
        ModelOutput::Logits(vec![0.2, 1.3]),
    )
}

pub(crate) fn stub_model_with(
    task: TaskType,
    name: &str,
    shape: ModelShape,
    output: ModelOutput,
) -> LoadedModel {
    LoadedModel {
        key: ModelKey::new(task, name),
        backend: Box::new(StubBackend { shape, output }),
        metadata: None,
        checksum: None,
        artifact_path: None,
    }
}

/// Model whose forward pass always fails
pub(crate) fn failing_model(task: TaskType, name: &str) -> LoadedModel {
    LoadedModel {
        key: ModelKey::new(task, name),
        backend: Box::new(FailingBackend),
        metadata: None,
        checksum: None,
        artifact_path: None,
    }
}
