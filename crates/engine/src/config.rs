//! Engine configuration

use anyhow::Result;
use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Model hub base URL
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// Scratch directory for downloaded model artifacts
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,

    /// Idle TTL for loaded models, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Interval between cache eviction sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Maximum accepted model artifact size, in bytes
    #[serde(default = "default_max_artifact_bytes")]
    pub max_artifact_bytes: usize,

    /// Upper bound on one model load, in seconds
    #[serde(default = "default_load_timeout")]
    pub load_timeout_secs: u64,
}

fn default_api_port() -> u16 {
    8080
}

fn default_hub_url() -> String {
    engine_lib::hub::DEFAULT_HUB_URL.to_string()
}

fn default_scratch_dir() -> String {
    std::env::temp_dir()
        .join("pharmq-engine")
        .to_string_lossy()
        .into_owned()
}

fn default_cache_ttl() -> u64 {
    2 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_max_artifact_bytes() -> usize {
    engine_lib::hub::DEFAULT_MAX_ARTIFACT_BYTES
}

fn default_load_timeout() -> u64 {
    120
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| EngineConfig {
            api_port: default_api_port(),
            hub_url: default_hub_url(),
            scratch_dir: default_scratch_dir(),
            cache_ttl_secs: default_cache_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            max_artifact_bytes: default_max_artifact_bytes(),
            load_timeout_secs: default_load_timeout(),
        }))
    }
}
