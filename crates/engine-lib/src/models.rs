//! Core data models for the prediction engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supported prediction tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "DTI")]
    Dti,
    #[serde(rename = "DTA")]
    Dta,
    #[serde(rename = "DDI")]
    Ddi,
    #[serde(rename = "ADMET")]
    Admet,
    #[serde(rename = "Similarity")]
    Similarity,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Dti,
        TaskType::Dta,
        TaskType::Ddi,
        TaskType::Admet,
        TaskType::Similarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Dti => "DTI",
            TaskType::Dta => "DTA",
            TaskType::Ddi => "DDI",
            TaskType::Admet => "ADMET",
            TaskType::Similarity => "Similarity",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DTI" => Ok(TaskType::Dti),
            "DTA" => Ok(TaskType::Dta),
            "DDI" => Ok(TaskType::Ddi),
            "ADMET" => Ok(TaskType::Admet),
            "SIMILARITY" => Ok(TaskType::Similarity),
            other => Err(format!("Unknown task: {}", other)),
        }
    }
}

/// Unique identity for a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    pub task: TaskType,
    pub model_name: String,
}

impl ModelKey {
    pub fn new(task: TaskType, model_name: impl Into<String>) -> Self {
        Self {
            task,
            model_name: model_name.into(),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.task, self.model_name)
    }
}

/// Model entry supplied by the model registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSourceConfig {
    /// Hub repository path, e.g. "DeepChem/ChemBERTa-77M-MLM"
    pub path: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed remote configuration document plus documentation flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Raw hub config document (config.json)
    pub config: serde_json::Value,
    /// Whether the model card could be fetched
    pub documentation_available: bool,
}

impl ModelMetadata {
    /// Number of output labels declared by the hub config, if any
    pub fn num_labels(&self) -> Option<usize> {
        self.config
            .get("id2label")
            .and_then(|v| v.as_object())
            .map(|m| m.len())
    }

    /// Hidden size declared by the hub config, if any
    pub fn hidden_size(&self) -> Option<usize> {
        self.config
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }
}

/// Outcome status of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionStatus {
    Success,
    Error,
}

/// Uniform result contract returned by every task handler
///
/// Never raised as an error to the caller; failures are carried in
/// `status` and `details.error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Numeric score or a string label, depending on the task
    pub score: serde_json::Value,
    pub status: PredictionStatus,
    pub model_info: String,
    pub timestamp: i64,
    pub details: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_explanation: Option<String>,
}

/// Summary of a loaded model, as reported by the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedModelSummary {
    pub task: TaskType,
    pub model_name: String,
    pub shape: String,
    pub checksum: Option<String>,
    pub loaded_at: i64,
    pub last_used: i64,
}

/// DTI / DTA prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPredictionRequest {
    pub drug_smiles: String,
    pub target_sequence: String,
    /// Affinity measurement type for DTA (IC50, Kd, Ki)
    #[serde(default)]
    pub affinity_type: Option<String>,
}

/// DDI prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugPairRequest {
    pub drug1_smiles: String,
    pub drug2_smiles: String,
    #[serde(default)]
    pub interaction_type: Option<String>,
}

/// ADMET prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmetRequest {
    pub drug_smiles: String,
    pub properties: Vec<String>,
}

/// Similarity search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityRequest {
    pub query_smiles: String,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_threshold() -> f32 {
    0.7
}

fn default_method() -> String {
    "cosine".to_string()
}

fn default_max_results() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskType::Admet).unwrap(),
            "\"ADMET\""
        );
        assert_eq!(
            serde_json::from_str::<TaskType>("\"Similarity\"").unwrap(),
            TaskType::Similarity
        );
    }

    #[test]
    fn test_task_type_parse() {
        assert_eq!("dti".parse::<TaskType>().unwrap(), TaskType::Dti);
        assert!("DXI".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_model_key_display() {
        let key = ModelKey::new(TaskType::Dti, "ChemBERTa-DTI");
        assert_eq!(key.to_string(), "DTI_ChemBERTa-DTI");
    }

    #[test]
    fn test_metadata_introspection() {
        let meta = ModelMetadata {
            config: serde_json::json!({
                "id2label": {"0": "no_interaction", "1": "interaction"},
                "hidden_size": 384
            }),
            documentation_available: true,
        };
        assert_eq!(meta.num_labels(), Some(2));
        assert_eq!(meta.hidden_size(), Some(384));
    }

    #[test]
    fn test_similarity_request_defaults() {
        let req: SimilarityRequest = serde_json::from_str("{\"query_smiles\": \"CCO\"}").unwrap();
        assert!((req.threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.max_results, 10);
        assert_eq!(req.method, "cosine");
    }
}
