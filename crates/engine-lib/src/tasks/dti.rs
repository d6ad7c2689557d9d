//! Drug-target interaction handler
//!
//! Decodes to a binary interaction probability. Pipeline-shaped models use
//! their native label/score pair (inverted for negative labels);
//! classification heads go through softmax; models exposing no logits fall
//! back to a sigmoid over the mean hidden state and are flagged degraded.

use super::decode::{mean, sigmoid, softmax};
use super::result::ResultBuilder;
use crate::cache::LoadedModel;
use crate::encoder::{EncodedInput, MoleculeTokenizer, SequenceTokenizer, SEQUENCE_MAX_LEN};
use crate::error::EngineResult;
use crate::models::{PredictionResult, TargetPredictionRequest};
use crate::shape::{DecodeResult, ModelOutput};
use serde_json::json;

/// Labels treated as the negative class of a pipeline model
const NEGATIVE_LABEL_MARKERS: &[&str] = &["no", "neg", "label_0"];

pub(super) fn run(
    model: &LoadedModel,
    req: &TargetPredictionRequest,
    molecules: &MoleculeTokenizer,
    sequences: &SequenceTokenizer,
) -> EngineResult<PredictionResult> {
    let drug = molecules.encode(&req.drug_smiles)?;
    let target = sequences.encode(&req.target_sequence)?;
    let input = EncodedInput::pair(&drug, &target, SEQUENCE_MAX_LEN);

    let output = model.backend.forward(&input)?;
    let decoded = decode_probability(&output);

    let p = decoded.value;
    let confidence = p.max(1.0 - p) as f32;
    let prediction = if p >= 0.5 {
        "interaction"
    } else {
        "no_interaction"
    };

    Ok(ResultBuilder::new(&model.key.model_name)
        .detail("prediction", prediction)
        .detail("interpretation", interpret(p))
        .degraded(decoded.degraded)
        .success(json!(p), Some(confidence), None))
}

/// Decode any output shape into an interaction probability
fn decode_probability(output: &ModelOutput) -> DecodeResult {
    match output {
        ModelOutput::LabelScore { label, score } => {
            let lower = label.to_lowercase();
            let negative = NEGATIVE_LABEL_MARKERS.iter().any(|m| lower.contains(m));
            let p = if negative {
                1.0 - *score as f64
            } else {
                *score as f64
            };
            DecodeResult::exact(p.clamp(0.0, 1.0))
        }
        ModelOutput::Logits(logits) if logits.len() >= 2 => {
            let probs = softmax(logits);
            DecodeResult::exact(probs[1] as f64)
        }
        ModelOutput::Logits(logits) if logits.len() == 1 => {
            DecodeResult::exact(sigmoid(logits[0] as f64))
        }
        // No logits exposed: sigmoid over the mean hidden state
        ModelOutput::Hidden(hidden) | ModelOutput::Embedding(hidden) => {
            DecodeResult::degraded(sigmoid(mean(hidden)))
        }
        ModelOutput::Logits(_) => DecodeResult::degraded(0.5),
    }
}

fn interpret(p: f64) -> &'static str {
    if p > 0.7 {
        "Strong interaction predicted - High therapeutic potential"
    } else if p > 0.5 {
        "Moderate interaction predicted - Further validation recommended"
    } else {
        "Weak interaction predicted - Consider alternative targets"
    }
}
