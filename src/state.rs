use std::sync::Arc;

use crate::config::ServerConfig;
use crate::plugin::PluginRegistry;

/// Shared application state handed to every handler
pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<PluginRegistry>,
}

impl AppState {
    /// Create state with an empty registry built from `config.plugins`
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let registry = Arc::new(PluginRegistry::new(config.plugins.clone()));
        Self::with_registry(config, registry)
    }

    /// Create state around an existing registry
    pub fn with_registry(config: ServerConfig, registry: Arc<PluginRegistry>) -> Arc<Self> {
        Arc::new(Self { config, registry })
    }
}
