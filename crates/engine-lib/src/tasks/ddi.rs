//! Drug-drug interaction handler
//!
//! Multi-class softmax over {no_interaction, synergistic, antagonistic}, or
//! binary when the model exposes two classes. The predicted label is the
//! arg-max; severity is derived by thresholding the winning probability.

use super::decode::{argmax, mean, sigmoid, softmax};
use super::result::ResultBuilder;
use crate::cache::LoadedModel;
use crate::encoder::{EncodedInput, MoleculeTokenizer, SMILES_MAX_LEN};
use crate::error::EngineResult;
use crate::models::{DrugPairRequest, PredictionResult};
use crate::shape::{ModelOutput, DDI_LABELS};
use serde_json::json;

/// Severity thresholds on the winning class probability
const HIGH_SEVERITY: f64 = 0.8;
const MEDIUM_SEVERITY: f64 = 0.5;

const BINARY_LABELS: [&str; 2] = ["no_interaction", "interaction"];

struct DdiDecode {
    label: String,
    probability: f64,
    degraded: bool,
}

pub(super) fn run(
    model: &LoadedModel,
    req: &DrugPairRequest,
    molecules: &MoleculeTokenizer,
) -> EngineResult<PredictionResult> {
    let drug1 = molecules.encode(&req.drug1_smiles)?;
    let drug2 = molecules.encode(&req.drug2_smiles)?;
    let input = EncodedInput::pair(&drug1, &drug2, SMILES_MAX_LEN);

    let output = model.backend.forward(&input)?;
    let decoded = decode_interaction(&output);

    let severity = severity(decoded.probability);

    Ok(ResultBuilder::new(&model.key.model_name)
        .detail("probability", decoded.probability)
        .detail("severity", severity)
        .detail("recommendation", recommendation(severity))
        .degraded(decoded.degraded)
        .success(
            json!(decoded.label),
            Some(decoded.probability as f32),
            None,
        ))
}

fn decode_interaction(output: &ModelOutput) -> DdiDecode {
    match output {
        ModelOutput::LabelScore { label, score } => DdiDecode {
            label: label.clone(),
            probability: (*score as f64).clamp(0.0, 1.0),
            degraded: false,
        },
        ModelOutput::Logits(logits) if logits.len() >= 2 => {
            let probs = softmax(logits);
            let (idx, p) = argmax(&probs).unwrap_or((0, 0.0));
            let labels: &[&str] = if logits.len() == 2 {
                &BINARY_LABELS
            } else {
                &DDI_LABELS
            };
            DdiDecode {
                label: labels
                    .get(idx)
                    .map(|l| (*l).to_string())
                    .unwrap_or_else(|| format!("class_{}", idx)),
                probability: p as f64,
                degraded: false,
            }
        }
        ModelOutput::Hidden(hidden) | ModelOutput::Embedding(hidden) => {
            let p = sigmoid(mean(hidden));
            DdiDecode {
                label: if p >= 0.5 {
                    "interaction".to_string()
                } else {
                    "no_interaction".to_string()
                },
                probability: p,
                degraded: true,
            }
        }
        ModelOutput::Logits(logits) => {
            let p = logits.first().map_or(0.5, |l| sigmoid(*l as f64));
            DdiDecode {
                label: BINARY_LABELS[usize::from(p >= 0.5)].to_string(),
                probability: p,
                degraded: true,
            }
        }
    }
}

fn severity(probability: f64) -> &'static str {
    if probability > HIGH_SEVERITY {
        "High"
    } else if probability > MEDIUM_SEVERITY {
        "Medium"
    } else {
        "Low"
    }
}

fn recommendation(severity: &str) -> &'static str {
    match severity {
        "High" => "High interaction risk - Contraindicated combination",
        "Medium" => "Moderate risk - Monitor patient closely",
        _ => "Low risk - Safe combination",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_class_argmax() {
        let out = ModelOutput::Logits(vec![0.1, 3.0, 0.1]);
        let decoded = decode_interaction(&out);
        assert_eq!(decoded.label, "synergistic");
        assert!(decoded.probability > 0.8);
        assert!(!decoded.degraded);
    }

    #[test]
    fn test_binary_labels() {
        let out = ModelOutput::Logits(vec![2.0, 0.0]);
        let decoded = decode_interaction(&out);
        assert_eq!(decoded.label, "no_interaction");
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(severity(0.9), "High");
        assert_eq!(severity(0.6), "Medium");
        assert_eq!(severity(0.4), "Low");
        // Thresholds are exclusive
        assert_eq!(severity(0.8), "Medium");
        assert_eq!(severity(0.5), "Low");
    }

    #[test]
    fn test_hidden_fallback_degraded() {
        let out = ModelOutput::Hidden(vec![0.0; 8]);
        let decoded = decode_interaction(&out);
        assert!(decoded.degraded);
        assert!((decoded.probability - 0.5).abs() < 1e-6);
    }
}
