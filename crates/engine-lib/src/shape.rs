//! Model shapes and the inference backend contract
//!
//! Each loaded model carries an explicit shape tag instead of stringly-typed
//! dispatch: classification heads, label/score pipelines, embedding
//! extractors, and the general fallback all implement the same backend
//! contract, so the loader's fallback chain stays explicit and testable.

use crate::encoder::EncodedInput;
use crate::error::{EngineError, EngineResult};
use crate::tasks::decode::softmax;
use tract_onnx::prelude::*;

/// Output widths up to this size are treated as logits; anything wider is a
/// hidden state with no exposed classification head.
const MAX_LOGIT_WIDTH: usize = 16;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Shape of a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    /// Classification head exposing raw logits
    Classification,
    /// Bundled pre/post-processing returning a label/score pair
    Pipeline,
    /// Pooled embedding extractor
    Embedding,
    /// Fallback shape with no task-specific head
    General,
}

impl ModelShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelShape::Classification => "classification",
            ModelShape::Pipeline => "pipeline",
            ModelShape::Embedding => "embedding",
            ModelShape::General => "general",
        }
    }
}

/// Normalized output of a forward pass
#[derive(Debug, Clone)]
pub enum ModelOutput {
    /// Raw logits from a classification head
    Logits(Vec<f32>),
    /// Native label/score pair from a pipeline-shaped model
    LabelScore { label: String, score: f32 },
    /// Pooled embedding vector
    Embedding(Vec<f32>),
    /// Pooled hidden state from a model with no classification head
    Hidden(Vec<f32>),
}

/// Decoded scalar with a flag distinguishing a real prediction from a
/// structural fallback (e.g. missing logits)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeResult {
    pub value: f64,
    pub degraded: bool,
}

impl DecodeResult {
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    pub fn degraded(value: f64) -> Self {
        Self {
            value,
            degraded: true,
        }
    }
}

/// Contract every loaded model fulfils
pub trait ModelBackend: Send + Sync {
    /// Run the forward pass over an encoded input
    fn forward(&self, input: &EncodedInput) -> EngineResult<ModelOutput>;

    /// Shape tag this backend was instantiated with
    fn shape(&self) -> ModelShape;
}

/// Default DDI label set, used when the hub config declares none
pub const DDI_LABELS: [&str; 3] = ["no_interaction", "synergistic", "antagonistic"];

/// ONNX-backed model using tract for lightweight inference
pub struct TractBackend {
    plan: TractModel,
    shape: ModelShape,
    input_len: usize,
    /// Label names for pipeline-shaped models, index-aligned with logits
    labels: Vec<String>,
}

impl TractBackend {
    /// Instantiate a classification-shaped model
    pub fn classification(bytes: &[u8], input_len: usize) -> EngineResult<Self> {
        Ok(Self {
            plan: build_plan(bytes, input_len)?,
            shape: ModelShape::Classification,
            input_len,
            labels: Vec::new(),
        })
    }

    /// Instantiate a pipeline-shaped model with its label set
    pub fn pipeline(bytes: &[u8], input_len: usize, labels: Vec<String>) -> EngineResult<Self> {
        if labels.is_empty() {
            return Err(EngineError::Load(
                "Pipeline shape requires a label set".to_string(),
            ));
        }
        Ok(Self {
            plan: build_plan(bytes, input_len)?,
            shape: ModelShape::Pipeline,
            input_len,
            labels,
        })
    }

    /// Instantiate an embedding extractor
    pub fn embedding(bytes: &[u8], input_len: usize) -> EngineResult<Self> {
        Ok(Self {
            plan: build_plan(bytes, input_len)?,
            shape: ModelShape::Embedding,
            input_len,
            labels: Vec::new(),
        })
    }

    /// Instantiate the general fallback shape
    pub fn general(bytes: &[u8], input_len: usize) -> EngineResult<Self> {
        Ok(Self {
            plan: build_plan(bytes, input_len)?,
            shape: ModelShape::General,
            input_len,
            labels: Vec::new(),
        })
    }

    /// Build the input tensor, re-padding to the plan's expected length
    fn input_tensor(&self, input: &EncodedInput) -> EngineResult<Tensor> {
        let mut ids = input.ids.clone();
        ids.resize(self.input_len, crate::encoder::PAD_ID);
        let array = tract_ndarray::Array2::from_shape_vec((1, self.input_len), ids)
            .map_err(|e| EngineError::Inference(format!("Bad input tensor shape: {}", e)))?;
        Ok(array.into())
    }
}

/// Parse, optimize, and make runnable an ONNX model over token ids
fn build_plan(bytes: &[u8], input_len: usize) -> EngineResult<TractModel> {
    tract_onnx::onnx()
        .model_for_read(&mut std::io::Cursor::new(bytes))
        .map_err(|e| EngineError::Load(format!("Failed to parse ONNX model: {}", e)))?
        .with_input_fact(0, i64::fact([1, input_len]).into())
        .map_err(|e| EngineError::Load(format!("Failed to set input shape: {}", e)))?
        .into_optimized()
        .map_err(|e| EngineError::Load(format!("Failed to optimize model: {}", e)))?
        .into_runnable()
        .map_err(|e| EngineError::Load(format!("Failed to create runnable model: {}", e)))
}

impl ModelBackend for TractBackend {
    fn forward(&self, input: &EncodedInput) -> EngineResult<ModelOutput> {
        let tensor = self.input_tensor(input)?;
        let result = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| EngineError::Inference(format!("Forward pass failed: {}", e)))?;
        let output = result
            .first()
            .ok_or_else(|| EngineError::Inference("No output from model".to_string()))?;

        let view = output
            .to_array_view::<f32>()
            .map_err(|e| EngineError::Inference(format!("Unexpected output type: {}", e)))?;

        // Pool [batch, seq, hidden] outputs over the sequence axis; pass
        // [batch, width] outputs through as-is.
        let values: Vec<f32> = if view.ndim() == 3 {
            let seq = view.shape()[1];
            let hidden = view.shape()[2];
            let flat: Vec<f32> = view.iter().copied().collect();
            (0..hidden)
                .map(|h| {
                    let sum: f32 = (0..seq).map(|s| flat[s * hidden + h]).sum();
                    sum / seq as f32
                })
                .collect()
        } else {
            view.iter().copied().collect()
        };

        if values.is_empty() {
            return Err(EngineError::Inference("Empty model output".to_string()));
        }

        Ok(match self.shape {
            ModelShape::Classification => {
                if values.len() <= MAX_LOGIT_WIDTH {
                    ModelOutput::Logits(values)
                } else {
                    // No classification head on the exported graph
                    ModelOutput::Hidden(values)
                }
            }
            ModelShape::Pipeline => {
                let probs = softmax(&values);
                let (idx, score) = probs
                    .iter()
                    .copied()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap_or((0, 0.0));
                let label = self
                    .labels
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| format!("LABEL_{}", idx));
                ModelOutput::LabelScore { label, score }
            }
            ModelShape::Embedding => ModelOutput::Embedding(values),
            ModelShape::General => ModelOutput::Hidden(values),
        })
    }

    fn shape(&self) -> ModelShape {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_tags() {
        assert_eq!(ModelShape::Classification.as_str(), "classification");
        assert_eq!(ModelShape::General.as_str(), "general");
    }

    #[test]
    fn test_decode_result_constructors() {
        assert!(!DecodeResult::exact(0.9).degraded);
        assert!(DecodeResult::degraded(0.5).degraded);
    }

    #[test]
    fn test_invalid_onnx_bytes_rejected() {
        let result = TractBackend::classification(b"not an onnx model", 8);
        assert!(matches!(result, Err(EngineError::Load(_))));
    }

    #[test]
    fn test_pipeline_requires_labels() {
        let result = TractBackend::pipeline(b"irrelevant", 8, Vec::new());
        assert!(matches!(result, Err(EngineError::Load(_))));
    }
}
