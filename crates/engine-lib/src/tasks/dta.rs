//! Drug-target affinity handler
//!
//! Decodes to a scalar binding affinity in μM, clamped to the
//! domain-reasonable range. Regression outputs are not self-calibrated, so
//! confidence is a fixed moderate constant.

use super::decode::mean;
use super::result::ResultBuilder;
use crate::cache::LoadedModel;
use crate::encoder::{EncodedInput, MoleculeTokenizer, SequenceTokenizer, SEQUENCE_MAX_LEN};
use crate::error::EngineResult;
use crate::models::{PredictionResult, TargetPredictionRequest};
use crate::shape::{DecodeResult, ModelOutput};
use serde_json::json;

/// Affinity clamp bounds, μM
pub const AFFINITY_MIN: f64 = 0.001;
pub const AFFINITY_MAX: f64 = 1000.0;

/// Fixed confidence for regression outputs
pub const DTA_CONFIDENCE: f32 = 0.7;

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
    let decoded = decode_affinity(&output);
    let affinity = decoded.value.clamp(AFFINITY_MIN, AFFINITY_MAX);

    let affinity_type = req.affinity_type.as_deref().unwrap_or("IC50");

    Ok(ResultBuilder::new(&model.key.model_name)
        .detail("affinity_type", affinity_type)
        .detail("units", "uM")
        .detail("binding_strength", binding_strength(affinity))
        .degraded(decoded.degraded)
        .success(
            json!(affinity),
            Some(DTA_CONFIDENCE),
            Some("Regression outputs are not self-calibrated".to_string()),
        ))
}

/// Pull a raw scalar out of any output shape
fn decode_affinity(output: &ModelOutput) -> DecodeResult {
    match output {
        ModelOutput::Logits(logits) if !logits.is_empty() => {
            DecodeResult::exact(logits[0].abs() as f64)
        }
        ModelOutput::LabelScore { score, .. } => DecodeResult::exact(*score as f64),
        ModelOutput::Hidden(hidden) | ModelOutput::Embedding(hidden) => {
            DecodeResult::degraded(mean(hidden).abs() * 100.0)
        }
        ModelOutput::Logits(_) => DecodeResult::degraded(1.0),
    }
}

/// Lower μM means tighter binding
fn binding_strength(affinity_um: f64) -> &'static str {
    if affinity_um < 1.0 {
        "strong"
    } else if affinity_um < 100.0 {
        "moderate"
    } else {
        "weak"
    }
}
