//! Trusted-source validation for model hub paths
//!
//! Pure allow-list gate applied before any network activity. A path that
//! fails here must never reach the metadata fetcher or loader.

/// Publisher prefixes approved for model loading
pub const TRUSTED_PREFIXES: &[&str] = &[
    "DeepChem/",
    "microsoft/",
    "facebook/",
    "google/",
    "nvidia/",
    "allenai/",
    "dmis-lab/",
    "sentence-transformers/",
    "huggingface/",
];

/// Check whether a hub path comes from a trusted publisher
///
/// Total function: no I/O, no failure mode beyond `false`. Rejects empty or
/// malformed strings (embedded whitespace, path traversal, absolute paths,
/// explicit URL schemes).
pub fn is_trusted(path: &str) -> bool {
    if path.is_empty() || path.len() > 256 {
        return false;
    }
    if path.chars().any(char::is_whitespace) {
        return false;
    }
    if path.contains("..") || path.starts_with('/') || path.contains("://") {
        return false;
    }
    TRUSTED_PREFIXES.iter().any(|p| path.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_publishers_accepted() {
        assert!(is_trusted("DeepChem/ChemBERTa-77M-MLM"));
        assert!(is_trusted("dmis-lab/biobert-base-cased-v1.1"));
        assert!(is_trusted("sentence-transformers/all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_unknown_publisher_rejected() {
        assert!(!is_trusted("untrusted/x"));
        assert!(!is_trusted("evil-corp/backdoored-model"));
    }

    #[test]
    fn test_malformed_paths_rejected() {
        assert!(!is_trusted(""));
        assert!(!is_trusted("  "));
        assert!(!is_trusted("DeepChem/../../etc/passwd"));
        assert!(!is_trusted("/DeepChem/model"));
        assert!(!is_trusted("https://DeepChem/model"));
        assert!(!is_trusted("DeepChem/model with spaces"));
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        // Prefix match includes the slash, so a lookalike org is rejected
        assert!(!is_trusted("DeepChemX/model"));
        assert!(!is_trusted("microsoft-fake/model"));
    }
}
