//! Prediction CLI commands

use anyhow::Result;
use colored::Colorize;

use crate::client::{
    AdmetRequest, ApiClient, DrugPairRequest, PredictionResult, SimilarityRequest,
    TargetPredictionRequest,
};
use crate::output::{color_confidence, color_status, format_score, OutputFormat};

pub async fn dti(
    client: &ApiClient,
    drug: &str,
    target: &str,
    format: OutputFormat,
) -> Result<()> {
    let request = TargetPredictionRequest {
        drug_smiles: drug.to_string(),
        target_sequence: target.to_string(),
        affinity_type: None,
    };
    let result: PredictionResult = client.post("predict/dti", &request).await?;
    print_result("Drug-Target Interaction", &result, format);
    Ok(())
}

pub async fn dta(
    client: &ApiClient,
    drug: &str,
    target: &str,
    affinity_type: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = TargetPredictionRequest {
        drug_smiles: drug.to_string(),
        target_sequence: target.to_string(),
        affinity_type,
    };
    let result: PredictionResult = client.post("predict/dta", &request).await?;
    print_result("Drug-Target Affinity", &result, format);
    Ok(())
}

pub async fn ddi(
    client: &ApiClient,
    drug1: &str,
    drug2: &str,
    format: OutputFormat,
) -> Result<()> {
    let request = DrugPairRequest {
        drug1_smiles: drug1.to_string(),
        drug2_smiles: drug2.to_string(),
    };
    let result: PredictionResult = client.post("predict/ddi", &request).await?;
    print_result("Drug-Drug Interaction", &result, format);
    Ok(())
}

pub async fn admet(
    client: &ApiClient,
    drug: &str,
    properties: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = AdmetRequest {
        drug_smiles: drug.to_string(),
        properties,
    };
    let result: PredictionResult = client.post("predict/admet", &request).await?;
    print_result("ADMET Properties", &result, format);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn similarity(
    client: &ApiClient,
    query: &str,
    threshold: f32,
    method: &str,
    max_results: usize,
    format: OutputFormat,
) -> Result<()> {
    let request = SimilarityRequest {
        query_smiles: query.to_string(),
        threshold,
        method: method.to_string(),
        max_results,
    };
    let result: PredictionResult = client.post("predict/similarity", &request).await?;
    print_result("Molecular Similarity", &result, format);
    Ok(())
}

/// Render one prediction result
fn print_result(title: &str, result: &PredictionResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Table => {
            println!("{}", title.bold());
            println!("  Status:     {}", color_status(&result.status));
            println!("  Model:      {}", result.model_info);
            println!("  Score:      {}", format_score(&result.score));
            if let Some(confidence) = result.confidence {
                println!("  Confidence: {}", color_confidence(confidence));
            }
            if let Some(explanation) = &result.confidence_explanation {
                println!("  Note:       {}", explanation);
            }
            if !result.details.is_empty() {
                println!("  Details:");
                for (key, value) in &result.details {
                    println!("    {}: {}", key, format_score(value));
                }
            }
        }
    }
}
