//! Dispatcher-level tests covering the error-normalization boundary

use super::*;
use crate::cache::ModelCache;
use crate::corpus::ReferenceCorpus;
use crate::models::PredictionStatus;
use crate::shape::{ModelOutput, ModelShape};
use crate::testutil::{failing_model, stub_model, stub_model_with};
use serde_json::json;

fn dispatcher(cache: Arc<ModelCache>) -> TaskDispatcher {
    TaskDispatcher::new(cache, Arc::new(ReferenceCorpus::builtin()))
}

fn dti_request() -> TargetPredictionRequest {
    TargetPredictionRequest {
        drug_smiles: "CCO".to_string(),
        target_sequence: "MKTVRQERLKSIVRILERSKEPVSGAQ".to_string(),
        affinity_type: None,
    }
}

#[tokio::test]
async fn test_no_model_loaded_returns_error_result() {
    let dispatcher = dispatcher(Arc::new(ModelCache::new()));
    let result = dispatcher.predict_dti(&dti_request()).await;

    assert_eq!(result.status, PredictionStatus::Error);
    assert!(result.details["error"]
        .as_str()
        .unwrap()
        .contains("no model loaded"));
}

#[tokio::test]
async fn test_dti_success_score_in_unit_interval() {
    let cache = Arc::new(ModelCache::new());
    cache.install(stub_model(TaskType::Dti, "m1")).await;
    let dispatcher = dispatcher(cache);

    let result = dispatcher.predict_dti(&dti_request()).await;

    assert_eq!(result.status, PredictionStatus::Success);
    let score = result.score.as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
    let confidence = result.confidence.unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_unload_then_predict_is_error() {
    let cache = Arc::new(ModelCache::new());
    cache.install(stub_model(TaskType::Dti, "m1")).await;
    cache.unload(TaskType::Dti, "m1").await;
    let dispatcher = dispatcher(cache);

    let result = dispatcher.predict_dti(&dti_request()).await;
    assert_eq!(result.status, PredictionStatus::Error);
    assert!(result.details["error"]
        .as_str()
        .unwrap()
        .contains("no model loaded"));
}

#[tokio::test]
async fn test_encode_failure_becomes_error_result() {
    let cache = Arc::new(ModelCache::new());
    cache.install(stub_model(TaskType::Dti, "m1")).await;
    let dispatcher = dispatcher(cache);

    let req = TargetPredictionRequest {
        drug_smiles: "CCO{invalid}".to_string(),
        target_sequence: "MKTV".to_string(),
        affinity_type: None,
    };
    let result = dispatcher.predict_dti(&req).await;

    assert_eq!(result.status, PredictionStatus::Error);
    assert!(result.details["error"]
        .as_str()
        .unwrap()
        .contains("encoding failed"));
}

#[tokio::test]
async fn test_inference_failure_never_escapes() {
    let cache = Arc::new(ModelCache::new());
    cache.install(failing_model(TaskType::Dti, "broken")).await;
    let dispatcher = dispatcher(cache);

    let result = dispatcher.predict_dti(&dti_request()).await;
    assert_eq!(result.status, PredictionStatus::Error);
    assert!(result.details.contains_key("error"));
}

#[tokio::test]
async fn test_dta_score_clamped() {
    let cache = Arc::new(ModelCache::new());
    cache
        .install(stub_model_with(
            TaskType::Dta,
            "m1",
            ModelShape::Classification,
            ModelOutput::Logits(vec![1.0e9]),
        ))
        .await;
    let dispatcher = dispatcher(cache);

    let result = dispatcher.predict_dta(&dti_request()).await;
    let score = result.score.as_f64().unwrap();
    assert!((AFFINITY_MIN..=AFFINITY_MAX).contains(&score));
    assert_eq!(result.confidence, Some(DTA_CONFIDENCE));
}

#[tokio::test]
async fn test_ddi_label_and_severity() {
    let cache = Arc::new(ModelCache::new());
    cache
        .install(stub_model_with(
            TaskType::Ddi,
            "m1",
            ModelShape::Classification,
            ModelOutput::Logits(vec![0.1, 4.0, 0.1]),
        ))
        .await;
    let dispatcher = dispatcher(cache);

    let req = DrugPairRequest {
        drug1_smiles: "CCO".to_string(),
        drug2_smiles: "CC(=O)O".to_string(),
        interaction_type: None,
    };
    let result = dispatcher.predict_ddi(&req).await;

    assert_eq!(result.status, PredictionStatus::Success);
    assert_eq!(result.score, json!("synergistic"));
    assert_eq!(result.details["severity"], json!("High"));
    let confidence = result.confidence.unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_admet_property_isolation() {
    let cache = Arc::new(ModelCache::new());
    cache.install(stub_model(TaskType::Admet, "m1")).await;
    let dispatcher = dispatcher(cache);

    let req = AdmetRequest {
        drug_smiles: "CCO".to_string(),
        properties: vec!["absorption".to_string(), "bogus_prop".to_string()],
    };
    let result = dispatcher.predict_admet(&req).await;

    assert_eq!(result.status, PredictionStatus::Success);
    // Valid property is numeric
    assert!(result.details["absorption"].is_number());
    // Unknown property is an isolated error entry
    assert!(result.details["bogus_prop"]["error"].is_string());
    // Overall score is computed only from the numeric entries
    let overall = result.score.as_f64().unwrap();
    let absorption = result.details["absorption"].as_f64().unwrap();
    assert!((overall - absorption).abs() < 1e-9);
}

#[tokio::test]
async fn test_admet_all_properties_failed() {
    let cache = Arc::new(ModelCache::new());
    cache.install(stub_model(TaskType::Admet, "m1")).await;
    let dispatcher = dispatcher(cache);

    let req = AdmetRequest {
        drug_smiles: "CCO".to_string(),
        properties: vec!["bogus1".to_string(), "bogus2".to_string()],
    };
    let result = dispatcher.predict_admet(&req).await;

    assert_eq!(result.status, PredictionStatus::Error);
}

#[tokio::test]
async fn test_similarity_results_respect_contract() {
    let cache = Arc::new(ModelCache::new());
    cache
        .install(stub_model_with(
            TaskType::Similarity,
            "emb",
            ModelShape::Embedding,
            ModelOutput::Embedding(vec![0.4; 16]),
        ))
        .await;
    let dispatcher = dispatcher(cache);

    let req = SimilarityRequest {
        query_smiles: "CCO".to_string(),
        threshold: 0.3,
        method: "cosine".to_string(),
        max_results: 4,
    };
    let result = dispatcher.predict_similarity(&req).await;

    assert_eq!(result.status, PredictionStatus::Success);
    let hits = result.details["results"].as_array().unwrap();
    assert!(hits.len() <= 4);
    let mut prev = f64::INFINITY;
    for hit in hits {
        let sim = hit["similarity"].as_f64().unwrap();
        assert!(sim >= 0.3);
        assert!(sim <= prev);
        prev = sim;
    }
    let confidence = result.confidence.unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_degraded_fallback_flagged() {
    let cache = Arc::new(ModelCache::new());
    cache
        .install(stub_model_with(
            TaskType::Dti,
            "headless",
            ModelShape::Classification,
            ModelOutput::Hidden(vec![0.0; 128]),
        ))
        .await;
    let dispatcher = dispatcher(cache);

    let result = dispatcher.predict_dti(&dti_request()).await;

    assert_eq!(result.status, PredictionStatus::Success);
    assert_eq!(result.details["degraded"], json!(true));
    let score = result.score.as_f64().unwrap();
    assert!((score - 0.5).abs() < 0.01);
}
