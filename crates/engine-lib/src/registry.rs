//! Built-in model registry
//!
//! Maps each task to its approved hub models. The registry is an external
//! collaborator from the engine's point of view; this module ships the
//! default catalogue so the engine is usable out of the box.

use crate::models::{ModelSourceConfig, TaskType};

/// Registry of approved models per task
pub struct ModelRegistry {
    entries: Vec<(TaskType, &'static str, ModelSourceConfig)>,
}

impl ModelRegistry {
    /// Build the default catalogue of approved hub models
    pub fn builtin() -> Self {
        let entry = |task, name: &'static str, path: &str, desc: &str| {
            (
                task,
                name,
                ModelSourceConfig {
                    path: path.to_string(),
                    display_name: name.to_string(),
                    description: Some(desc.to_string()),
                },
            )
        };

        Self {
            entries: vec![
                entry(
                    TaskType::Dti,
                    "ChemBERTa-DTI",
                    "DeepChem/ChemBERTa-77M-MLM",
                    "Chemical BERT model for drug-target interaction prediction",
                ),
                entry(
                    TaskType::Dti,
                    "BioBERT-DTI",
                    "dmis-lab/biobert-base-cased-v1.1",
                    "BioBERT adapted for drug-target interaction prediction",
                ),
                entry(
                    TaskType::Dta,
                    "DeepDTA-BERT",
                    "microsoft/BiomedNLP-PubMedBERT-base-uncased-abstract-fulltext",
                    "PubMedBERT adapted for drug-target affinity prediction",
                ),
                entry(
                    TaskType::Dta,
                    "GraphDTA",
                    "allenai/scibert_scivocab_uncased",
                    "SciBERT for drug-target affinity prediction",
                ),
                entry(
                    TaskType::Ddi,
                    "DrugBERT-DDI",
                    "facebook/bart-base",
                    "BART-based model for drug-drug interaction prediction",
                ),
                entry(
                    TaskType::Admet,
                    "ChemBERTa-ADMET",
                    "DeepChem/ChemBERTa-77M-MLM",
                    "ChemBERTa for ADMET property prediction",
                ),
                entry(
                    TaskType::Admet,
                    "MolNet-ADMET",
                    "microsoft/BiomedNLP-PubMedBERT-base-uncased-abstract",
                    "PubMedBERT for comprehensive ADMET analysis",
                ),
                entry(
                    TaskType::Similarity,
                    "MolBERT-Similarity",
                    "sentence-transformers/all-MiniLM-L6-v2",
                    "Sentence transformer adapted for molecular similarity",
                ),
                entry(
                    TaskType::Similarity,
                    "ChemBERTa-Embeddings",
                    "DeepChem/ChemBERTa-77M-MLM",
                    "ChemBERTa for molecular embedding generation",
                ),
            ],
        }
    }

    /// Look up a model config by task and name
    pub fn get(&self, task: TaskType, model_name: &str) -> Option<&ModelSourceConfig> {
        self.entries
            .iter()
            .find(|(t, name, _)| *t == task && *name == model_name)
            .map(|(_, _, cfg)| cfg)
    }

    /// All models registered for a task
    pub fn for_task(&self, task: TaskType) -> Vec<(&'static str, &ModelSourceConfig)> {
        self.entries
            .iter()
            .filter(|(t, _, _)| *t == task)
            .map(|(_, name, cfg)| (*name, cfg))
            .collect()
    }

    /// Total number of registered models
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
