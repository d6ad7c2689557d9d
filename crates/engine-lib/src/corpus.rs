//! Candidate corpus for similarity search
//!
//! The corpus is a pluggable dependency: production deployments are expected
//! to wire a real fingerprint index behind `CandidateCorpus`. The default
//! `ReferenceCorpus` is an in-memory reference set that projects candidate
//! structures into the query embedding space deterministically.

use serde::{Deserialize, Serialize};

/// A similarity search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub smiles: String,
    pub similarity: f32,
}

/// Nearest-neighbour search over a candidate set
pub trait CandidateCorpus: Send + Sync {
    /// Return up to `top_k` candidates ranked by similarity to `embedding`,
    /// descending
    fn search(&self, embedding: &[f32], top_k: usize) -> Vec<Candidate>;
}

/// In-memory reference compound set
pub struct ReferenceCorpus {
    compounds: Vec<(String, String)>,
}

impl ReferenceCorpus {
    /// Reference set of common small molecules
    pub fn builtin() -> Self {
        let compounds = [
            ("Aspirin", "CC(=O)OC1=CC=CC=C1C(=O)O"),
            ("Ibuprofen", "CC(C)CC1=CC=C(C=C1)C(C)C(=O)O"),
            ("Paracetamol", "CC(=O)NC1=CC=C(C=C1)O"),
            ("Caffeine", "CN1C=NC2=C1C(=O)N(C(=O)N2C)C"),
            ("Ethanol", "CCO"),
            ("Benzene", "c1ccccc1"),
            ("Naproxen", "CC(C1=CC2=CC(=CC=C2C=C1)OC)C(=O)O"),
            ("Warfarin", "CC(=O)CC(C1=CC=CC=C1)C1=C(O)C2=CC=CC=C2OC1=O"),
            ("Metformin", "CN(C)C(=N)NC(=N)N"),
            ("Atorvastatin", "CC(C)C1=C(C(=O)NC2=CC=CC=C2)C(C2=CC=CC=C2)=C(C2=CC=C(F)C=C2)N1"),
        ];
        Self {
            compounds: compounds
                .iter()
                .map(|(n, s)| (n.to_string(), s.to_string()))
                .collect(),
        }
    }

    pub fn with_compounds(compounds: Vec<(String, String)>) -> Self {
        Self { compounds }
    }

    /// Project a structure string into a fixed-dimension vector
    ///
    /// Deterministic character-histogram projection so candidates can be
    /// compared against any query embedding dimension.
    fn project(smiles: &str, dim: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dim];
        if dim == 0 {
            return v;
        }
        for (i, c) in smiles.chars().enumerate() {
            let bucket = (c as usize).wrapping_mul(31).wrapping_add(i) % dim;
            v[bucket] += 1.0;
        }
        v
    }
}

impl CandidateCorpus for ReferenceCorpus {
    fn search(&self, embedding: &[f32], top_k: usize) -> Vec<Candidate> {
        let mut hits: Vec<Candidate> = self
            .compounds
            .iter()
            .map(|(name, smiles)| {
                let projected = Self::project(smiles, embedding.len());
                Candidate {
                    name: name.clone(),
                    smiles: smiles.clone(),
                    similarity: cosine_similarity(embedding, &projected),
                }
            })
            .collect();
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(top_k);
        hits
    }
}

/// Cosine similarity, mapped from [-1, 1] into [0, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    ((dot / (norm_a * norm_b)) + 1.0) / 2.0
}
