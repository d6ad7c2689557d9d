//! Error taxonomy for the prediction engine
//!
//! Internal components return `Result<_, EngineError>`; the task dispatcher
//! is the single place where errors are normalized into the stable
//! `PredictionResult` contract.

use thiserror::Error;

/// Engine error taxonomy
#[derive(Debug, Error)]
pub enum EngineError {
    /// Untrusted model path or malformed input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Hub metadata or artifact fetch failure
    #[error("network error: {0}")]
    Network(String),

    /// Model instantiation failure after validation succeeded
    #[error("model load failed: {0}")]
    Load(String),

    /// Tokenization/encoding failure on a given input
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Unexpected shape or missing output from the forward pass
    #[error("inference failed: {0}")]
    Inference(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Network(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
