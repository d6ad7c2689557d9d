//! PharmQ Engine - therapeutic model lifecycle and inference service
//!
//! This binary serves the model lifecycle API: loading hub models into an
//! exclusive per-task cache and running multi-task predictions over them.

use anyhow::Result;
use engine_lib::{
    health::{components, HealthRegistry},
    hub::{ArtifactStore, MetadataFetcher},
    EngineMetrics, ModelCache, ModelLoader, ModelRegistry, ReferenceCorpus, TaskDispatcher,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting pharmq-engine");

    let config = config::EngineConfig::load()?;
    info!(
        api_port = config.api_port,
        hub_url = %config.hub_url,
        cache_ttl_secs = config.cache_ttl_secs,
        "Engine configured"
    );

    let cache = Arc::new(ModelCache::new());
    let registry = Arc::new(ModelRegistry::builtin());
    let metrics = EngineMetrics::new();

    let fetcher = MetadataFetcher::with_base_url(&config.hub_url)?;
    let store = ArtifactStore::new(&config.scratch_dir, config.max_artifact_bytes)?;
    // Remove artifacts orphaned by a previous run
    store.cleanup();

    let health_registry = HealthRegistry::new();
    health_registry.register(components::CACHE).await;
    health_registry.register(components::HUB).await;

    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let loader = Arc::new(
        ModelLoader::new(Arc::clone(&cache), fetcher, store)
            .with_ttl(ttl)
            .with_load_timeout(Duration::from_secs(config.load_timeout_secs))
            .with_health(health_registry.clone()),
    );

    let dispatcher = Arc::new(TaskDispatcher::new(
        Arc::clone(&cache),
        Arc::new(ReferenceCorpus::builtin()),
    ));

    let app_state = Arc::new(api::AppState {
        cache: Arc::clone(&cache),
        loader,
        dispatcher,
        registry,
        health_registry: health_registry.clone(),
    });

    health_registry.set_ready(true).await;

    // Periodic sweep removes models idle past their TTL
    let sweep_cache = Arc::clone(&cache);
    let sweep_metrics = metrics.clone();
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = sweep_cache.evict_expired(ttl).await;
            if evicted > 0 {
                info!(evicted, "Evicted idle models");
                for _ in 0..evicted {
                    sweep_metrics.inc_eviction("ttl");
                }
                sweep_metrics.set_models_loaded(sweep_cache.len().await as i64);
            }
        }
    });

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    sweeper.abort();
    api_handle.abort();
    // Dropping cached models removes their scratch artifacts
    cache.unload_all().await;

    Ok(())
}
