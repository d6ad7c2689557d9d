//! Molecular similarity handler
//!
//! Extracts a pooled embedding for the query and searches the candidate
//! corpus, filtering by threshold and truncating to the requested result
//! count. Results are always sorted by similarity descending.

use super::result::ResultBuilder;
use crate::cache::LoadedModel;
use crate::corpus::CandidateCorpus;
use crate::encoder::MoleculeTokenizer;
use crate::error::{EngineError, EngineResult};
use crate::models::{PredictionResult, SimilarityRequest};
use crate::shape::ModelOutput;
use serde_json::json;

/// Confidence when the search produced at least one hit
const CONFIDENCE_WITH_RESULTS: f32 = 0.8;

/// Confidence when nothing cleared the threshold
const CONFIDENCE_EMPTY: f32 = 0.3;

pub(super) fn run(
    model: &LoadedModel,
    req: &SimilarityRequest,
    molecules: &MoleculeTokenizer,
    corpus: &dyn CandidateCorpus,
) -> EngineResult<PredictionResult> {
    let input = molecules.encode(&req.query_smiles)?;
    let output = model.backend.forward(&input)?;

    let embedding = match output {
        ModelOutput::Embedding(v) | ModelOutput::Hidden(v) => v,
        _ => {
            return Err(EngineError::Inference(
                "Similarity model produced no embedding".to_string(),
            ))
        }
    };

    // Over-fetch so threshold filtering still fills max_results
    let mut hits = corpus.search(&embedding, req.max_results.saturating_mul(4));
    hits.retain(|c| c.similarity >= req.threshold);
    hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    hits.truncate(req.max_results);

    let top_similarity = hits.first().map_or(0.0, |c| c.similarity);
    let confidence = if hits.is_empty() {
        CONFIDENCE_EMPTY
    } else {
        CONFIDENCE_WITH_RESULTS
    };

    Ok(ResultBuilder::new(&model.key.model_name)
        .detail("method", req.method.as_str())
        .detail("threshold", req.threshold)
        .detail("total_found", hits.len())
        .detail("results", serde_json::to_value(&hits).unwrap_or_default())
        .success(json!(top_similarity), Some(confidence), None))
}
