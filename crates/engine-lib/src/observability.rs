//! Observability infrastructure for the prediction engine
//!
//! Prometheus metrics for model lifecycle events and inference activity.

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
use std::sync::OnceLock;

use crate::models::TaskType;

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Histogram buckets for model load duration (in seconds)
const LOAD_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct EngineMetricsInner {
    inference_latency_seconds: HistogramVec,
    load_duration_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    model_loads_total: IntCounterVec,
    models_loaded: IntGauge,
    models_evicted_total: IntCounterVec,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            inference_latency_seconds: register_histogram_vec!(
                "engine_inference_latency_seconds",
                "Time spent running inference for a prediction task",
                &["task"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            load_duration_seconds: register_histogram_vec!(
                "engine_model_load_duration_seconds",
                "Time spent validating, downloading, and instantiating a model",
                &["task"],
                LOAD_BUCKETS.to_vec()
            )
            .expect("Failed to register load_duration_seconds"),

            predictions_total: register_int_counter_vec!(
                "engine_predictions_total",
                "Prediction requests by task and outcome",
                &["task", "status"]
            )
            .expect("Failed to register predictions_total"),

            model_loads_total: register_int_counter_vec!(
                "engine_model_loads_total",
                "Model load attempts by task and outcome",
                &["task", "result"]
            )
            .expect("Failed to register model_loads_total"),

            models_loaded: register_int_gauge!(
                "engine_models_loaded",
                "Number of models currently resident in the cache"
            )
            .expect("Failed to register models_loaded"),

            models_evicted_total: register_int_counter_vec!(
                "engine_models_evicted_total",
                "Models evicted from the cache by reason",
                &["reason"]
            )
            .expect("Failed to register models_evicted_total"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Multiple clones
/// share the same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record an inference latency observation for one task
    pub fn observe_inference_latency(&self, task: TaskType, duration_secs: f64) {
        self.inner()
            .inference_latency_seconds
            .with_label_values(&[task.as_str()])
            .observe(duration_secs);
    }

    /// Record the wall time of a model load attempt
    pub fn observe_load_duration(&self, task: TaskType, duration_secs: f64) {
        self.inner()
            .load_duration_seconds
            .with_label_values(&[task.as_str()])
            .observe(duration_secs);
    }

    /// Count a prediction outcome ("success", "error", "no_model")
    pub fn inc_prediction(&self, task: TaskType, status: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[task.as_str(), status])
            .inc();
    }

    /// Count a model load attempt outcome ("loaded", "cached", "rejected", "failed")
    pub fn inc_model_load(&self, task: TaskType, result: &str) {
        self.inner()
            .model_loads_total
            .with_label_values(&[task.as_str(), result])
            .inc();
    }

    /// Update the resident model count
    pub fn set_models_loaded(&self, count: i64) {
        self.inner().models_loaded.set(count);
    }

    /// Count an eviction ("task_exclusive", "ttl", "manual")
    pub fn inc_eviction(&self, reason: &str) {
        self.inner()
            .models_evicted_total
            .with_label_values(&[reason])
            .inc();
    }
}
