//! Result normalization
//!
//! Every prediction outcome, success or failure, is wrapped into the one
//! stable `PredictionResult` shape here. Confidence values are always
//! clamped to [0, 1] before leaving the engine.

use crate::models::{PredictionResult, PredictionStatus, TaskType};
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds `PredictionResult` values for one model
pub struct ResultBuilder {
    model_info: String,
    details: BTreeMap<String, Value>,
    degraded: bool,
}

impl ResultBuilder {
    pub fn new(model_info: impl Into<String>) -> Self {
        Self {
            model_info: model_info.into(),
            details: BTreeMap::new(),
            degraded: false,
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Mark the result as produced by a structural fallback rather than the
    /// model's native head
    pub fn degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn success(
        mut self,
        score: Value,
        confidence: Option<f32>,
        confidence_explanation: Option<String>,
    ) -> PredictionResult {
        if self.degraded {
            self.details.insert("degraded".to_string(), Value::Bool(true));
        }
        PredictionResult {
            score,
            status: PredictionStatus::Success,
            model_info: self.model_info,
            timestamp: chrono::Utc::now().timestamp(),
            details: self.details,
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
            confidence_explanation,
        }
    }

    pub fn error(mut self, message: impl Into<String>) -> PredictionResult {
        self.details
            .insert("error".to_string(), Value::String(message.into()));
        PredictionResult {
            score: Value::Null,
            status: PredictionStatus::Error,
            model_info: self.model_info,
            timestamp: chrono::Utc::now().timestamp(),
            details: self.details,
            confidence: None,
            confidence_explanation: None,
        }
    }
}

/// Error result for a task with no model in the cache
pub fn no_model(task: TaskType) -> PredictionResult {
    ResultBuilder::new("none").error(format!("no model loaded for task {}", task))
}
