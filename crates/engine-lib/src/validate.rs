//! Request validation
//!
//! Cheap structural checks applied at the API boundary, before a request
//! reaches the encoder or touches any loaded model. Validation failures are
//! client errors, never engine errors.

use crate::error::{EngineError, EngineResult};
use crate::tasks::KNOWN_PROPERTIES;

/// Longest accepted SMILES string
pub const MAX_SMILES_LEN: usize = 2000;

/// Longest accepted protein sequence
pub const MAX_SEQUENCE_LEN: usize = 10_000;

/// Similarity methods the search layer understands
pub const SIMILARITY_METHODS: &[&str] = &[
    "cosine",
    "tanimoto",
    "dice",
    "euclidean",
    "jaccard",
    "manhattan",
];

/// Characters permitted in a SMILES string
fn is_smiles_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "()[]{}@+-=#$%/\\.:*".contains(c)
}

/// Check a SMILES string for length and charset
pub fn validate_smiles(smiles: &str) -> EngineResult<()> {
    if smiles.trim().is_empty() {
        return Err(EngineError::Validation("SMILES string is empty".to_string()));
    }
    if smiles.len() > MAX_SMILES_LEN {
        return Err(EngineError::Validation(format!(
            "SMILES string exceeds {} characters",
            MAX_SMILES_LEN
        )));
    }
    if let Some(c) = smiles.chars().find(|c| !is_smiles_char(*c)) {
        return Err(EngineError::Validation(format!(
            "Invalid character {:?} in SMILES string",
            c
        )));
    }
    Ok(())
}

/// Check a protein sequence for length and residue alphabet
///
/// Accepts alphabetic residue codes, case-insensitive. Non-standard codes
/// pass here and are rejected by the encoder, which fails closed.
pub fn validate_protein_sequence(sequence: &str) -> EngineResult<()> {
    if sequence.trim().is_empty() {
        return Err(EngineError::Validation(
            "Protein sequence is empty".to_string(),
        ));
    }
    if sequence.len() > MAX_SEQUENCE_LEN {
        return Err(EngineError::Validation(format!(
            "Protein sequence exceeds {} residues",
            MAX_SEQUENCE_LEN
        )));
    }
    if let Some(c) = sequence
        .chars()
        .find(|c| !c.is_ascii_alphabetic())
    {
        return Err(EngineError::Validation(format!(
            "Invalid residue {:?} in protein sequence",
            c
        )));
    }
    Ok(())
}

/// Check that every requested ADMET property name is known
pub fn validate_properties(properties: &[String]) -> EngineResult<()> {
    if properties.is_empty() {
        return Err(EngineError::Validation(
            "No ADMET properties requested".to_string(),
        ));
    }
    for property in properties {
        let normalized = property.to_lowercase();
        if !KNOWN_PROPERTIES.contains(&normalized.as_str()) {
            return Err(EngineError::Validation(format!(
                "Unknown ADMET property: {}",
                property
            )));
        }
    }
    Ok(())
}

/// Check a similarity method name against the supported set
pub fn validate_similarity_method(method: &str) -> EngineResult<()> {
    let normalized = method.to_lowercase();
    if !SIMILARITY_METHODS.contains(&normalized.as_str()) {
        return Err(EngineError::Validation(format!(
            "Unsupported similarity method: {}",
            method
        )));
    }
    Ok(())
}

/// Check a similarity threshold is a probability
pub fn validate_threshold(threshold: f32) -> EngineResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EngineError::Validation(format!(
            "Similarity threshold must be in [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_smiles_accepted() {
        for smiles in ["CCO", "CC(=O)OC1=CC=CC=C1C(=O)O", "c1ccccc1", "[Na+].[Cl-]"] {
            assert!(validate_smiles(smiles).is_ok(), "{} rejected", smiles);
        }
    }

    #[test]
    fn test_invalid_smiles_rejected() {
        assert!(validate_smiles("").is_err());
        assert!(validate_smiles("   ").is_err());
        assert!(validate_smiles("CCO<script>").is_err());
        assert!(validate_smiles(&"C".repeat(MAX_SMILES_LEN + 1)).is_err());
    }

    #[test]
    fn test_protein_sequence_validation() {
        assert!(validate_protein_sequence("MKTVRQERLKSIVRIL").is_ok());
        assert!(validate_protein_sequence("mktvrq").is_ok());
        assert!(validate_protein_sequence("").is_err());
        assert!(validate_protein_sequence("MKTV RQ").is_err());
        assert!(validate_protein_sequence("MKTV123").is_err());
    }

    #[test]
    fn test_property_validation() {
        assert!(validate_properties(&["absorption".to_string(), "Toxicity".to_string()]).is_ok());
        assert!(validate_properties(&[]).is_err());
        assert!(validate_properties(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_similarity_method_validation() {
        assert!(validate_similarity_method("cosine").is_ok());
        assert!(validate_similarity_method("Tanimoto").is_ok());
        assert!(validate_similarity_method("hamming").is_err());
    }

    #[test]
    fn test_threshold_validation() {
        assert!(validate_threshold(0.7).is_ok());
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.1).is_err());
    }
}
