//! Task encoders for molecular and protein inputs
//!
//! Converts line-notation molecular strings and protein sequences into
//! fixed-length token-id tensors with pad/truncate semantics. Both encoders
//! fail closed: any character outside the vocabulary aborts the encode
//! rather than producing a partially built tensor.

use crate::error::{EngineError, EngineResult};

/// Default maximum length for molecular inputs
pub const SMILES_MAX_LEN: usize = 512;

/// Default maximum length for protein sequences
pub const SEQUENCE_MAX_LEN: usize = 1024;

/// Padding token id
pub const PAD_ID: i64 = 0;

/// Separator token id used when joining paired inputs
pub const SEP_ID: i64 = 1;

/// First id assigned to vocabulary entries (0 and 1 are reserved)
const VOCAB_BASE: i64 = 2;

/// SMILES vocabulary: single characters plus the two-letter element tokens
const SMILES_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789()[]=-#@+\\/:.%";

/// Two-letter element symbols tokenized as single units
const SMILES_DIGRAPHS: &[&str] = &["Cl", "Br", "Si", "Se"];

/// Standard amino acid codes
const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// A fixed-length encoded input ready for the forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInput {
    /// Token ids padded with `PAD_ID` to the configured max length
    pub ids: Vec<i64>,
    /// Unpadded token count (after truncation)
    pub len: usize,
}

impl EncodedInput {
    fn from_tokens(mut tokens: Vec<i64>, max_len: usize) -> Self {
        tokens.truncate(max_len);
        let len = tokens.len();
        tokens.resize(max_len, PAD_ID);
        Self { ids: tokens, len }
    }

    /// Join two encoded inputs with a separator, re-padding to `max_len`
    ///
    /// Used for paired tasks (drug + target, drug + drug) where the model
    /// consumes a single sequence.
    pub fn pair(a: &EncodedInput, b: &EncodedInput, max_len: usize) -> Self {
        let mut tokens = Vec::with_capacity(a.len + b.len + 1);
        tokens.extend_from_slice(&a.ids[..a.len]);
        tokens.push(SEP_ID);
        tokens.extend_from_slice(&b.ids[..b.len]);
        Self::from_tokens(tokens, max_len)
    }
}

/// Tokenizer for line-notation molecular strings
#[derive(Debug, Clone)]
pub struct MoleculeTokenizer {
    max_len: usize,
}

impl MoleculeTokenizer {
    pub fn new() -> Self {
        Self {
            max_len: SMILES_MAX_LEN,
        }
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Encode a molecular string into a fixed-length tensor
    pub fn encode(&self, smiles: &str) -> EngineResult<EncodedInput> {
        let smiles = smiles.trim();
        if smiles.is_empty() {
            return Err(EngineError::Encode("Empty molecular string".to_string()));
        }

        let chars: Vec<char> = smiles.chars().collect();
        let mut tokens = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            // Two-letter element symbols take precedence over single chars
            if i + 1 < chars.len() {
                let digraph: String = chars[i..=i + 1].iter().collect();
                if let Some(pos) = SMILES_DIGRAPHS.iter().position(|d| **d == digraph) {
                    tokens.push(VOCAB_BASE + SMILES_CHARS.len() as i64 + pos as i64);
                    i += 2;
                    continue;
                }
            }
            match SMILES_CHARS.find(chars[i]) {
                Some(pos) => tokens.push(VOCAB_BASE + pos as i64),
                None => {
                    return Err(EngineError::Encode(format!(
                        "Invalid character '{}' in molecular string",
                        chars[i]
                    )))
                }
            }
            i += 1;
        }

        Ok(EncodedInput::from_tokens(tokens, self.max_len))
    }
}

impl Default for MoleculeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenizer for protein amino-acid sequences
#[derive(Debug, Clone)]
pub struct SequenceTokenizer {
    max_len: usize,
}

impl SequenceTokenizer {
    pub fn new() -> Self {
        Self {
            max_len: SEQUENCE_MAX_LEN,
        }
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Encode a protein sequence into a fixed-length tensor
    ///
    /// Whitespace is stripped and the sequence upper-cased before validation
    /// against the 20 standard amino acid codes.
    pub fn encode(&self, sequence: &str) -> EngineResult<EncodedInput> {
        let cleaned: String = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if cleaned.is_empty() {
            return Err(EngineError::Encode("Empty protein sequence".to_string()));
        }

        let mut tokens = Vec::with_capacity(cleaned.len());
        for c in cleaned.chars() {
            match AMINO_ACIDS.find(c) {
                Some(pos) => tokens.push(VOCAB_BASE + pos as i64),
                None => {
                    return Err(EngineError::Encode(format!(
                        "Invalid amino acid code '{}'",
                        c
                    )))
                }
            }
        }

        Ok(EncodedInput::from_tokens(tokens, self.max_len))
    }
}

impl Default for SequenceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smiles_encode_pads_to_max_len() {
        let tokenizer = MoleculeTokenizer::new();
        let encoded = tokenizer.encode("CCO").unwrap();
        assert_eq!(encoded.ids.len(), SMILES_MAX_LEN);
        assert_eq!(encoded.len, 3);
        assert!(encoded.ids[3..].iter().all(|&id| id == PAD_ID));
    }

    #[test]
    fn test_smiles_digraph_single_token() {
        let tokenizer = MoleculeTokenizer::new();
        // Chlorobenzene: Cl counts as one token
        let encoded = tokenizer.encode("Clc1ccccc1").unwrap();
        assert_eq!(encoded.len, 9);
    }

    #[test]
    fn test_smiles_truncation() {
        let tokenizer = MoleculeTokenizer::with_max_len(4);
        let encoded = tokenizer.encode("CCOCCO").unwrap();
        assert_eq!(encoded.len, 4);
        assert_eq!(encoded.ids.len(), 4);
    }

    #[test]
    fn test_smiles_fails_closed() {
        let tokenizer = MoleculeTokenizer::new();
        assert!(tokenizer.encode("").is_err());
        assert!(tokenizer.encode("   ").is_err());
        assert!(tokenizer.encode("CCO{bad}").is_err());
    }

    #[test]
    fn test_sequence_normalization() {
        let tokenizer = SequenceTokenizer::new();
        let a = tokenizer.encode("mktv").unwrap();
        let b = tokenizer.encode(" M KT\nV ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len, 4);
    }

    #[test]
    fn test_sequence_rejects_non_amino_codes() {
        let tokenizer = SequenceTokenizer::new();
        assert!(tokenizer.encode("MKTVB").is_err()); // B is not a standard code
        assert!(tokenizer.encode("").is_err());
    }

    #[test]
    fn test_pair_joins_with_separator() {
        let mol = MoleculeTokenizer::new();
        let seq = SequenceTokenizer::new();
        let drug = mol.encode("CCO").unwrap();
        let target = seq.encode("MKTV").unwrap();

        let pair = EncodedInput::pair(&drug, &target, SEQUENCE_MAX_LEN);
        assert_eq!(pair.len, 3 + 1 + 4);
        assert_eq!(pair.ids[3], SEP_ID);
    }

    #[test]
    fn test_pair_truncates() {
        let mol = MoleculeTokenizer::new();
        let a = mol.encode("CCOCC").unwrap();
        let b = mol.encode("CCC").unwrap();
        let pair = EncodedInput::pair(&a, &b, 6);
        assert_eq!(pair.len, 6);
        assert_eq!(pair.ids.len(), 6);
    }
}
