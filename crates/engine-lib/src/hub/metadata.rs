//! Metadata fetcher for remote model configuration documents
//!
//! Two network calls per model: the structured config document (hard failure)
//! and a best-effort model card probe whose failure is swallowed and recorded
//! as `documentation_available = false`.

use crate::error::{EngineError, EngineResult};
use crate::models::ModelMetadata;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Timeout for the primary config document fetch
pub const CONFIG_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the best-effort documentation fetch
pub const DOC_TIMEOUT: Duration = Duration::from_secs(15);

/// Default hub base URL
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Environment variable holding the optional hub access token
pub const TOKEN_ENV: &str = "HF_TOKEN";

/// Fetches model configuration and documentation flags from the hub
pub struct MetadataFetcher {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl MetadataFetcher {
    /// Create a fetcher against the default hub
    ///
    /// An access token is read from `HF_TOKEN` if present; absence degrades
    /// to unauthenticated access rather than failing.
    pub fn new() -> EngineResult<Self> {
        Self::with_base_url(DEFAULT_HUB_URL)
    }

    /// Create a fetcher against a specific hub base URL
    pub fn with_base_url(base_url: &str) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(CONFIG_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| EngineError::Network(format!("Invalid hub URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        })
    }

    /// Fetch metadata for a validated hub path
    ///
    /// The config fetch is authoritative: unreachable or unparsable config is
    /// a hard `Network` error with no retry. The documentation probe never
    /// blocks the load.
    pub async fn fetch(&self, path: &str) -> EngineResult<ModelMetadata> {
        let config_url = self.resolve(path, "config.json")?;

        let mut request = self.client.get(config_url).timeout(CONFIG_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EngineError::Network(format!(
                "Config fetch for {} returned {}",
                path,
                response.status()
            )));
        }

        let config: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EngineError::Network(format!("Unparsable config for {}: {}", path, e)))?;

        let documentation_available = self.probe_documentation(path).await;

        debug!(
            path = %path,
            documentation_available,
            "Fetched model metadata"
        );

        Ok(ModelMetadata {
            config,
            documentation_available,
        })
    }

    /// Best-effort check for a model card; failures are swallowed
    async fn probe_documentation(&self, path: &str) -> bool {
        let url = match self.resolve(path, "README.md") {
            Ok(u) => u,
            Err(_) => return false,
        };

        let mut request = self.client.head(url).timeout(DOC_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(path = %path, error = %e, "Model card probe failed");
                false
            }
        }
    }

    /// Build a hub artifact URL for a repository file
    pub fn resolve(&self, path: &str, file: &str) -> EngineResult<Url> {
        self.base_url
            .join(&format!("{}/resolve/main/{}", path, file))
            .map_err(|e| EngineError::Network(format!("Invalid hub path {}: {}", path, e)))
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
