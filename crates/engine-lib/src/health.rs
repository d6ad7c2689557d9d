//! Liveness and readiness reporting
//!
//! Components report outcomes rather than set statuses directly: a single
//! failure marks a component degraded, a streak of failures marks it
//! unhealthy, and the next success clears it. The loader feeds hub
//! outcomes in; the HTTP layer reads the aggregate out.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive failures before a component is reported unhealthy
const UNHEALTHY_AFTER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Failing intermittently but still serving
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

/// Reported state of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn now(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Aggregate health over all registered components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst component status wins
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut status = ComponentStatus::Healthy;
        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => status = ComponentStatus::Degraded,
                ComponentStatus::Healthy => {}
            }
        }
        status
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names used by the engine
pub mod components {
    pub const CACHE: &str = "cache";
    pub const HUB: &str = "hub";
}

struct ComponentState {
    health: ComponentHealth,
    consecutive_failures: u32,
}

impl ComponentState {
    fn healthy() -> Self {
        Self {
            health: ComponentHealth::now(ComponentStatus::Healthy, None),
            consecutive_failures: 0,
        }
    }
}

/// Tracks component outcomes and the process readiness flag
#[derive(Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentState>>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            ready: Arc::new(RwLock::new(false)),
        }
    }

    /// Register a component as healthy
    pub async fn register(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), ComponentState::healthy());
    }

    /// Record a failed operation against a component
    ///
    /// One failure degrades the component; `UNHEALTHY_AFTER` consecutive
    /// failures mark it unhealthy.
    pub async fn report_failure(&self, name: &str, message: impl Into<String>) {
        let mut components = self.components.write().await;
        let state = components
            .entry(name.to_string())
            .or_insert_with(ComponentState::healthy);
        state.consecutive_failures += 1;
        let status = if state.consecutive_failures >= UNHEALTHY_AFTER {
            ComponentStatus::Unhealthy
        } else {
            ComponentStatus::Degraded
        };
        state.health = ComponentHealth::now(status, Some(message.into()));
    }

    /// Record a successful operation, clearing any failure streak
    pub async fn report_recovery(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), ComponentState::healthy());
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components: HashMap<String, ComponentHealth> = self
            .components
            .read()
            .await
            .iter()
            .map(|(name, state)| (name.clone(), state.health.clone()))
            .collect();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Engine not yet initialized".to_string()),
            };
        }
        if self.health().await.status == ComponentStatus::Unhealthy {
            return ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            };
        }
        ReadinessResponse {
            ready: true,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_healthy_until_failure_reported() {
        let registry = HealthRegistry::new();
        registry.register(components::CACHE).await;
        registry.register(components::HUB).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_single_failure_degrades() {
        let registry = HealthRegistry::new();
        registry.register(components::HUB).await;

        registry.report_failure(components::HUB, "timeout").await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.status.is_operational());
    }

    #[tokio::test]
    async fn test_failure_streak_goes_unhealthy() {
        let registry = HealthRegistry::new();
        registry.register(components::HUB).await;

        for _ in 0..3 {
            registry.report_failure(components::HUB, "timeout").await;
        }

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert!(!health.status.is_operational());
    }

    #[tokio::test]
    async fn test_recovery_clears_streak() {
        let registry = HealthRegistry::new();
        registry.register(components::HUB).await;

        registry.report_failure(components::HUB, "timeout").await;
        registry.report_failure(components::HUB, "timeout").await;
        registry.report_recovery(components::HUB).await;
        registry.report_failure(components::HUB, "timeout").await;

        // Streak restarted, so one failure after recovery only degrades
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_readiness_not_ready_initially() {
        let registry = HealthRegistry::new();
        let readiness = registry.readiness().await;

        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_readiness_blocked_by_unhealthy_component() {
        let registry = HealthRegistry::new();
        registry.register(components::HUB).await;
        registry.set_ready(true).await;
        assert!(registry.readiness().await.ready);

        for _ in 0..3 {
            registry.report_failure(components::HUB, "down").await;
        }
        assert!(!registry.readiness().await.ready);
    }
}
