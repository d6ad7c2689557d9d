//! ADMET property handler
//!
//! Each requested property is predicted independently; one property's
//! encode/infer failure is recorded as an error entry for that property only
//! and never aborts the others. The overall score is the mean of the numeric
//! property values.

use super::decode::{mean, sigmoid};
use super::result::ResultBuilder;
use crate::cache::LoadedModel;
use crate::encoder::MoleculeTokenizer;
use crate::error::{EngineError, EngineResult};
use crate::models::{AdmetRequest, PredictionResult};
use crate::shape::ModelOutput;
use serde_json::json;
use tracing::warn;

/// Per-property rescaling constants
///
/// Heuristic calibration carried from the reference implementation; kept
/// configurable so the constants can be recalibrated without code changes.
#[derive(Debug, Clone)]
pub struct AdmetScaling {
    /// Linear scale applied to LogP outputs
    pub logp_scale: f64,
    /// Linear scale applied to solubility outputs (clamped positive)
    pub solubility_scale: f64,
}

impl Default for AdmetScaling {
    fn default() -> Self {
        Self {
            logp_scale: 2.0,
            solubility_scale: 50.0,
        }
    }
}

/// Property names the scaler understands
pub const KNOWN_PROPERTIES: &[&str] = &[
    "absorption",
    "distribution",
    "metabolism",
    "excretion",
    "toxicity",
    "ld50",
    "logp",
    "solubility",
    "bioavailability",
    "clearance",
    "half_life",
    "protein_binding",
    "permeability",
];

impl AdmetScaling {
    /// Rescale a raw model output for one property
    ///
    /// Toxicity/LD50 and the ADME sub-properties map to sigmoid
    /// probabilities; LogP and solubility use linear scales.
    pub fn scale(&self, property: &str, raw: f64) -> EngineResult<f64> {
        match property {
            "toxicity" | "ld50" => Ok(sigmoid(raw)),
            "logp" => Ok(raw * self.logp_scale),
            "solubility" => Ok((raw * self.solubility_scale).max(0.0)),
            p if KNOWN_PROPERTIES.contains(&p) => Ok(sigmoid(raw)),
            other => Err(EngineError::Encode(format!(
                "Unknown ADMET property: {}",
                other
            ))),
        }
    }
}

pub(super) fn run(
    model: &LoadedModel,
    req: &AdmetRequest,
    molecules: &MoleculeTokenizer,
    scaling: &AdmetScaling,
) -> EngineResult<PredictionResult> {
    if req.properties.is_empty() {
        return Err(EngineError::Encode("No properties requested".to_string()));
    }

    let mut builder = ResultBuilder::new(&model.key.model_name);
    let mut numeric = Vec::new();

    for property in &req.properties {
        let property = property.to_lowercase();
        match predict_property(model, &req.drug_smiles, &property, molecules, scaling) {
            Ok(value) => {
                numeric.push(value);
                builder = builder.detail(&property, value);
            }
            Err(e) => {
                warn!(property = %property, error = %e, "ADMET property failed");
                builder = builder.detail(&property, json!({ "error": e.to_string() }));
            }
        }
    }

    if numeric.is_empty() {
        return Ok(builder.error("All requested properties failed"));
    }
    let overall = numeric.iter().sum::<f64>() / numeric.len() as f64;

    let total = req.properties.len();
    let confidence = numeric.len() as f32 / total as f32;
    Ok(builder.success(
        json!(overall),
        Some(confidence),
        Some(format!(
            "{} of {} properties predicted",
            numeric.len(),
            total
        )),
    ))
}

/// Encode, infer, and rescale a single property; isolated failure domain
fn predict_property(
    model: &LoadedModel,
    smiles: &str,
    property: &str,
    molecules: &MoleculeTokenizer,
    scaling: &AdmetScaling,
) -> EngineResult<f64> {
    if !KNOWN_PROPERTIES.contains(&property) {
        return Err(EngineError::Encode(format!(
            "Unknown ADMET property: {}",
            property
        )));
    }

    let input = molecules.encode(smiles)?;
    let output = model.backend.forward(&input)?;

    let raw = match &output {
        ModelOutput::Logits(logits) if !logits.is_empty() => logits[0] as f64,
        ModelOutput::LabelScore { score, .. } => *score as f64,
        ModelOutput::Hidden(hidden) | ModelOutput::Embedding(hidden) => mean(hidden),
        ModelOutput::Logits(_) => {
            return Err(EngineError::Inference("Empty logits".to_string()))
        }
    };

    scaling.scale(property, raw)
}
