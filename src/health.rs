//! Component health reporting for the generation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health status for a component or the overall system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is functioning normally
    Healthy,
    /// Component works with reduced capability
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

impl HealthStatus {
    /// Process exit code the CLI uses for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => 0,
            HealthStatus::Unhealthy => 1,
        }
    }

    /// Combines two health statuses, returning the worse of the two
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix timestamp of the check
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    fn build(
        component: impl Into<String>,
        status: HealthStatus,
        error: Option<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            component: component.into(),
            status,
            error,
            timestamp: chrono::Utc::now().timestamp(),
            details,
        }
    }

    pub fn healthy(component: impl Into<String>) -> Self {
        Self::build(component, HealthStatus::Healthy, None, None)
    }

    pub fn healthy_with_details(component: impl Into<String>, details: serde_json::Value) -> Self {
        Self::build(component, HealthStatus::Healthy, None, Some(details))
    }

    pub fn degraded(component: impl Into<String>, error: impl Into<String>) -> Self {
        Self::build(component, HealthStatus::Degraded, Some(error.into()), None)
    }

    pub fn degraded_with_details(
        component: impl Into<String>,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::build(
            component,
            HealthStatus::Degraded,
            Some(error.into()),
            Some(details),
        )
    }

    pub fn unhealthy(component: impl Into<String>, error: impl Into<String>) -> Self {
        Self::build(component, HealthStatus::Unhealthy, Some(error.into()), None)
    }

    pub fn unhealthy_with_details(
        component: impl Into<String>,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::build(
            component,
            HealthStatus::Unhealthy,
            Some(error.into()),
            Some(details),
        )
    }
}

/// Aggregated health of every pipeline component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    /// RFC 3339 time of the report
    pub timestamp: String,
    pub details: BTreeMap<String, ComponentHealth>,
}

impl HealthReport {
    /// Builds a report whose status is the worst of its components.
    pub fn from_components(components: impl IntoIterator<Item = ComponentHealth>) -> Self {
        let mut status = HealthStatus::Healthy;
        let mut details = BTreeMap::new();
        for component in components {
            status = status.combine(component.status);
            details.insert(component.component.clone(), component);
        }

        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details,
        }
    }
}
