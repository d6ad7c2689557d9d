//! Engine library for therapeutic prediction
//!
//! This crate provides the core functionality for:
//! - Trusted model source validation and hub metadata fetch
//! - Model lifecycle (download, instantiate, cache with task exclusivity)
//! - Molecular and protein sequence encoding
//! - Multi-task inference (DTI, DTA, DDI, ADMET, similarity)
//! - Health checks and observability

pub mod cache;
pub mod corpus;
pub mod encoder;
pub mod error;
pub mod health;
pub mod hub;
pub mod loader;
pub mod models;
pub mod observability;
pub mod registry;
pub mod shape;
pub mod tasks;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{LoadedModel, ModelCache, DEFAULT_TTL};
pub use corpus::{Candidate, CandidateCorpus, ReferenceCorpus};
pub use error::{EngineError, EngineResult};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use loader::ModelLoader;
pub use models::*;
pub use observability::EngineMetrics;
pub use registry::ModelRegistry;
pub use tasks::TaskDispatcher;
