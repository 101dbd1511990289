//! Plugin Lifecycle Management
//!
//! This module defines the plugin lifecycle states, the context handed to
//! plugins at initialization and the per-plugin bookkeeping the registry keeps.
//!
//! # Lifecycle State Machine
//!
//! ```text
//!     +-------------+
//!     | Constructed |  (registration table)
//!     +------+------+
//!            |
//!            v  initialize()
//!     +------+------+
//!     |             |
//!     v             v
//! +---+---+    +----+----+
//! | Ready |    |  Failed |  (dropped from the registry)
//! +---+---+    +---------+
//!     |
//!     v  shutdown()
//! +---+-----+
//! | Retired |  (removed from the live set)
//! +---------+
//! ```

use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

/// Plugin lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Constructed but `initialize()` has not completed
    Constructed,

    /// Initialized and accepting commands
    Ready,

    /// `initialize()` failed
    Failed,

    /// `shutdown()` has been called
    Retired,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginState::Constructed => write!(f, "constructed"),
            PluginState::Ready => write!(f, "ready"),
            PluginState::Failed => write!(f, "failed"),
            PluginState::Retired => write!(f, "retired"),
        }
    }
}

/// Context provided to plugins during initialization
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Plugin identity
    pub plugin_id: String,

    /// Directory reserved for this plugin's on-disk artifacts
    /// (`<plugin_dir>/<plugin_id>`). Not created by the registry.
    pub data_dir: PathBuf,

    /// Plugin-specific configuration (from `plugins.settings` in config)
    pub config: Value,
}

impl PluginContext {
    /// Create a new plugin context
    pub fn new(plugin_id: impl Into<String>, data_dir: impl Into<PathBuf>, config: Value) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            data_dir: data_dir.into(),
            config,
        }
    }
}

/// Per-plugin bookkeeping kept by the registry
#[derive(Debug)]
pub struct PluginEntry {
    /// Current plugin state
    pub state: PluginState,

    /// Time when the plugin was loaded
    pub loaded_at: Instant,

    /// Time when the plugin was last active
    pub last_active: Instant,

    /// Number of commands dispatched to the plugin
    pub call_count: u64,

    /// Number of dispatches that ended in an error
    pub error_count: u64,

    /// Last error message (if any)
    pub last_error: Option<String>,
}

impl PluginEntry {
    /// Create a new plugin entry
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            state: PluginState::Constructed,
            loaded_at: now,
            last_active: now,
            call_count: 0,
            error_count: 0,
            last_error: None,
        }
    }

    /// Record a successful call
    pub fn record_success(&mut self) {
        self.last_active = Instant::now();
        self.call_count += 1;
    }

    /// Record an error
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_active = Instant::now();
        self.call_count += 1;
        self.error_count += 1;
        self.last_error = Some(error.into());
    }

    /// Transition to a new state
    pub fn transition(&mut self, new_state: PluginState) {
        tracing::debug!(
            from = %self.state,
            to = %new_state,
            "Plugin state transition"
        );
        self.state = new_state;
    }

    /// Get uptime since loading
    pub fn uptime(&self) -> std::time::Duration {
        self.loaded_at.elapsed()
    }

    /// Get time since last activity
    pub fn idle_time(&self) -> std::time::Duration {
        self.last_active.elapsed()
    }
}

impl Default for PluginEntry {
    fn default() -> Self {
        Self::new()
    }
}
