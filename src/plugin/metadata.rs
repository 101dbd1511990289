//! Plugin Status Types
//!
//! Read-only snapshots handed out by the registry. Callers never see the live
//! plugin instances.

use serde::{Deserialize, Serialize};

/// Status snapshot of a live plugin (`describe()`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin identity
    pub name: String,

    /// Whether the plugin is initialized and accepting commands
    pub initialized: bool,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, initialized: bool) -> Self {
        Self {
            name: name.into(),
            initialized,
        }
    }
}

/// Plugin metrics for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct PluginMetrics {
    /// Number of commands dispatched to the plugin
    pub call_count: u64,
    /// Number of dispatches that ended in an error
    pub error_count: u64,
    /// Error rate (0.0 to 1.0)
    pub error_rate: f64,
    /// Last error message (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Idle time in seconds
    pub idle_seconds: u64,
    /// Current plugin state
    pub state: String,
}

impl PluginMetrics {
    /// Health label derived from the error rate
    pub fn health(&self) -> &'static str {
        if self.error_rate > 0.5 {
            "unhealthy"
        } else if self.error_rate > 0.1 {
            "degraded"
        } else {
            "healthy"
        }
    }
}
