//! HTTP API for model lifecycle, predictions, health checks, and metrics

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use engine_lib::{
    health::{ComponentStatus, HealthRegistry},
    models::{
        AdmetRequest, DrugPairRequest, SimilarityRequest, TargetPredictionRequest, TaskType,
    },
    validate, EngineError, ModelCache, ModelLoader, ModelRegistry, TaskDispatcher,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ModelCache>,
    pub loader: Arc<ModelLoader>,
    pub dispatcher: Arc<TaskDispatcher>,
    pub registry: Arc<ModelRegistry>,
    pub health_registry: HealthRegistry,
}

/// Body for load/unload requests
#[derive(Debug, Deserialize)]
pub struct ModelSelector {
    pub task: TaskType,
    pub model_name: String,
}

/// Optional task filter for the available-models listing
#[derive(Debug, Deserialize)]
pub struct TaskFilter {
    pub task: Option<String>,
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;
    let models_loaded = state.cache.len().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(json!({
            "status": health.status,
            "components": health.components,
            "models_loaded": models_loaded,
        })),
    )
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Catalogue of approved models, optionally filtered by task
async fn available_models(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TaskFilter>,
) -> impl IntoResponse {
    let tasks: Vec<TaskType> = match filter.task.as_deref() {
        Some(raw) => match raw.parse::<TaskType>() {
            Ok(task) => vec![task],
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": e })));
            }
        },
        None => TaskType::ALL.to_vec(),
    };

    let mut models = Vec::new();
    for task in tasks {
        for (name, config) in state.registry.for_task(task) {
            models.push(json!({
                "task": task,
                "model_name": name,
                "path": config.path,
                "display_name": config.display_name,
                "description": config.description,
            }));
        }
    }
    (StatusCode::OK, Json(json!({ "models": models })))
}

/// Models currently resident in the cache
async fn loaded_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let loaded = state.cache.list_loaded().await;
    Json(json!({ "models": loaded }))
}

/// Load a model into the cache
async fn load_model(
    State(state): State<Arc<AppState>>,
    Json(selector): Json<ModelSelector>,
) -> impl IntoResponse {
    let Some(config) = state.registry.get(selector.task, &selector.model_name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Unknown model {} for task {}", selector.model_name, selector.task)
            })),
        );
    };

    match state
        .loader
        .load(selector.task, &selector.model_name, config)
        .await
    {
        Ok(()) => {
            info!(task = %selector.task, model = %selector.model_name, "Load request succeeded");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "task": selector.task,
                    "model_name": selector.model_name,
                })),
            )
        }
        Err(e) => {
            let status = match &e {
                EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                EngineError::Network(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

/// Unload one model from the cache
async fn unload_model(
    State(state): State<Arc<AppState>>,
    Json(selector): Json<ModelSelector>,
) -> impl IntoResponse {
    let removed = state
        .cache
        .unload(selector.task, &selector.model_name)
        .await;
    if removed {
        (StatusCode::OK, Json(json!({ "success": true })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": format!("Model {} not loaded for task {}", selector.model_name, selector.task)
            })),
        )
    }
}

/// Unload every model from the cache
async fn unload_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state.cache.unload_all().await;
    Json(json!({ "success": true, "unloaded": removed }))
}

fn bad_request(e: EngineError) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

async fn predict_dti(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TargetPredictionRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate::validate_smiles(&req.drug_smiles)
        .and_then(|_| validate::validate_protein_sequence(&req.target_sequence))
    {
        return bad_request(e).into_response();
    }
    Json(state.dispatcher.predict_dti(&req).await).into_response()
}

async fn predict_dta(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TargetPredictionRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate::validate_smiles(&req.drug_smiles)
        .and_then(|_| validate::validate_protein_sequence(&req.target_sequence))
    {
        return bad_request(e).into_response();
    }
    Json(state.dispatcher.predict_dta(&req).await).into_response()
}

async fn predict_ddi(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DrugPairRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate::validate_smiles(&req.drug1_smiles)
        .and_then(|_| validate::validate_smiles(&req.drug2_smiles))
    {
        return bad_request(e).into_response();
    }
    Json(state.dispatcher.predict_ddi(&req).await).into_response()
}

async fn predict_admet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdmetRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate::validate_smiles(&req.drug_smiles)
        .and_then(|_| validate::validate_properties(&req.properties))
    {
        return bad_request(e).into_response();
    }
    Json(state.dispatcher.predict_admet(&req).await).into_response()
}

async fn predict_similarity(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimilarityRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate::validate_smiles(&req.query_smiles)
        .and_then(|_| validate::validate_similarity_method(&req.method))
        .and_then(|_| validate::validate_threshold(req.threshold))
    {
        return bad_request(e).into_response();
    }
    Json(state.dispatcher.predict_similarity(&req).await).into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/models/available", get(available_models))
        .route("/models/loaded", get(loaded_models))
        .route("/models/load", post(load_model))
        .route("/models/unload", post(unload_model))
        .route("/models/unload-all", post(unload_all))
        .route("/predict/dti", post(predict_dti))
        .route("/predict/dta", post(predict_dta))
        .route("/predict/ddi", post(predict_ddi))
        .route("/predict/admet", post(predict_admet))
        .route("/predict/similarity", post(predict_similarity))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
