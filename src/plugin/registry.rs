//! Plugin Registry
//!
//! This module provides the registry that owns the live plugin set. Plugin
//! implementations are registered at compile time with the `inventory` crate
//! (see [`register_plugin!`](crate::register_plugin)); the registry walks that
//! table once at startup, initializes every enabled plugin and routes
//! commands to it until teardown.
//!
//! # Architecture
//!
//! ```text
//! inventory table ──▶ discover() ──▶ DashMap<name, PluginHandle> ──▶ dispatch()
//!                                                 │
//!                                                 ▼
//!                                          shutdown_all()
//! ```
//!
//! Lookups go through a `DashMap` so concurrent dispatches never contend on a
//! registry-wide lock. Each handle keeps its plugin behind a `tokio` RwLock:
//! commands take the read side, lifecycle calls take the write side.
//!
//! # Usage
//!
//! ```ignore
//! let registry = PluginRegistry::new(config.plugins.clone());
//! registry.discover_registered().await;
//!
//! let response = registry
//!     .dispatch("system_info", PluginCommand::new("get_memory_info"))
//!     .await?;
//!
//! registry.shutdown_all().await;
//! ```

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::capabilities::Plugin;
use super::command::{PluginCommand, PluginResponse};
use super::isolation::{PluginError, call_plugin_safely_async, call_plugin_safely_value};
use super::lifecycle::{PluginContext, PluginEntry, PluginState};
use super::metadata::{PluginDescriptor, PluginMetrics};
use crate::config::PluginConfig;

/// Registration units whose file name starts with this prefix are internal
/// and never loaded.
pub const RESERVED_UNIT_PREFIX: &str = "__";

/// Factory function pointer type for plugins
pub type PluginFactoryPtr = fn() -> Box<dyn Plugin>;

/// Plugin constructor for inventory-based registration
///
/// `unit` names the source unit that registered the plugin (normally
/// `file!()`); it is used for reserved-name filtering and error reporting.
pub struct PluginConstructor {
    /// Source unit that submitted this constructor
    pub unit: &'static str,

    /// Factory function creating an uninitialized plugin
    pub create: PluginFactoryPtr,
}

impl PluginConstructor {
    /// Create a new plugin constructor
    pub const fn new(unit: &'static str, create: PluginFactoryPtr) -> Self {
        Self { unit, create }
    }

    /// File stem of the registering unit (e.g., "system_info")
    pub fn unit_name(&self) -> &str {
        Path::new(self.unit)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.unit)
    }

    /// Whether the registering unit is internal and must be skipped
    pub fn is_reserved(&self) -> bool {
        self.unit_name().starts_with(RESERVED_UNIT_PREFIX)
    }
}

// Collect all registered plugins at link time
inventory::collect!(PluginConstructor);

/// Iterate the compiled-in registration table
pub fn registered_constructors() -> impl Iterator<Item = &'static PluginConstructor> {
    inventory::iter::<PluginConstructor>.into_iter()
}

/// A registration that could not be turned into a live plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    /// Source unit of the failed registration
    pub unit: String,
    /// Plugin identity, if construction got that far
    pub plugin: Option<String>,
    /// Error message
    pub error: String,
}

/// Outcome of a discovery pass
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Plugins that are now live, in registration order
    pub loaded: Vec<String>,
    /// Identities skipped because an earlier registration already claimed them
    pub skipped_duplicates: Vec<String>,
    /// Identities skipped because they are not in the allow-list
    pub skipped_disabled: Vec<String>,
    /// Reserved units that were not loaded
    pub skipped_reserved: Vec<String>,
    /// Registrations that failed to construct or initialize
    pub failures: Vec<DiscoveryFailure>,
}

/// Live plugin together with the registry's bookkeeping for it
struct PluginHandle {
    name: String,
    unit: &'static str,
    plugin: tokio::sync::RwLock<Box<dyn Plugin>>,
    initialized: AtomicBool,
    entry: Mutex<PluginEntry>,
}

impl PluginHandle {
    fn new(name: String, unit: &'static str, plugin: Box<dyn Plugin>) -> Self {
        Self {
            name,
            unit,
            plugin: tokio::sync::RwLock::new(plugin),
            initialized: AtomicBool::new(false),
            entry: Mutex::new(PluginEntry::new()),
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn describe(&self) -> PluginDescriptor {
        PluginDescriptor::new(self.name.clone(), self.is_initialized())
    }

    async fn initialize(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        let mut plugin = self.plugin.write().await;
        let result = call_plugin_safely_async(plugin.initialize(ctx)).await;

        let mut entry = self.entry.lock();
        match result {
            Ok(()) => {
                self.initialized.store(true, Ordering::Release);
                entry.transition(PluginState::Ready);
                Ok(())
            }
            Err(e) => {
                entry.transition(PluginState::Failed);
                Err(e)
            }
        }
    }

    /// Retire the plugin. New dispatches are refused immediately; the write
    /// lock waits for commands already in flight.
    async fn shutdown(&self) -> Result<(), PluginError> {
        if !self.initialized.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let mut plugin = self.plugin.write().await;
        let result = call_plugin_safely_async(plugin.shutdown()).await;
        self.entry.lock().transition(PluginState::Retired);
        result
    }

    async fn handle_command(&self, command: PluginCommand) -> Result<PluginResponse, PluginError> {
        if !self.is_initialized() {
            return Ok(PluginResponse::not_initialized());
        }

        let plugin = self.plugin.read().await;
        call_plugin_safely_async(plugin.handle_command(command)).await
    }

    fn metrics(&self) -> PluginMetrics {
        let entry = self.entry.lock();
        PluginMetrics {
            call_count: entry.call_count,
            error_count: entry.error_count,
            error_rate: if entry.call_count > 0 {
                entry.error_count as f64 / entry.call_count as f64
            } else {
                0.0
            },
            last_error: entry.last_error.clone(),
            uptime_seconds: entry.uptime().as_secs(),
            idle_seconds: entry.idle_time().as_secs(),
            state: entry.state.to_string(),
        }
    }
}

/// Central plugin registry
///
/// Owns discovery, lifecycle and dispatch for the live plugin set. Created
/// once at startup and shared through [`AppState`](crate::state::AppState).
pub struct PluginRegistry {
    /// Settings snapshot taken at construction
    config: PluginConfig,

    /// Live plugins indexed by identity
    plugins: DashMap<String, Arc<PluginHandle>>,

    /// Identities in registration order (teardown order)
    order: RwLock<Vec<String>>,

    /// Serializes discovery and teardown
    lifecycle: tokio::sync::Mutex<()>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            plugins: DashMap::new(),
            order: RwLock::new(Vec::new()),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Settings snapshot the registry was created with
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Discover, filter and initialize every plugin in the compiled-in
    /// registration table
    pub async fn discover_registered(&self) -> DiscoveryReport {
        self.discover(registered_constructors()).await
    }

    /// Discover, filter and initialize plugins from `constructors`
    ///
    /// A failing registration is logged and skipped; it never aborts the
    /// rest of the pass. The first registration of an identity wins.
    pub async fn discover<'a, I>(&self, constructors: I) -> DiscoveryReport
    where
        I: IntoIterator<Item = &'a PluginConstructor>,
    {
        let _guard = self.lifecycle.lock().await;
        let mut report = DiscoveryReport::default();

        let Some(plugin_dir) = self.config.plugin_dir.clone() else {
            tracing::warn!("No plugin directory configured, no plugins loaded");
            return report;
        };

        if let Err(e) = tokio::fs::create_dir_all(&plugin_dir).await {
            tracing::warn!(
                plugin_dir = %plugin_dir.display(),
                error = %e,
                "Plugin directory is not available, no plugins loaded"
            );
            return report;
        }

        for constructor in constructors {
            let unit = constructor.unit;

            if constructor.is_reserved() {
                tracing::debug!(unit = %unit, "Skipping reserved plugin unit");
                report.skipped_reserved.push(unit.to_string());
                continue;
            }

            let plugin = match call_plugin_safely_value(constructor.create) {
                Ok(plugin) => plugin,
                Err(e) => {
                    tracing::error!(unit = %unit, error = %e, "Failed to load plugin");
                    report.failures.push(DiscoveryFailure {
                        unit: unit.to_string(),
                        plugin: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let name = plugin.name().to_string();

            if self.plugins.contains_key(&name) {
                tracing::warn!(plugin = %name, unit = %unit, "Plugin already loaded, skipping");
                report.skipped_duplicates.push(name);
                continue;
            }

            if !self.config.is_enabled(&name) {
                tracing::debug!(plugin = %name, "Plugin not in enabled list, skipping");
                report.skipped_disabled.push(name);
                continue;
            }

            let ctx = PluginContext::new(
                name.clone(),
                plugin_dir.join(&name),
                self.config
                    .settings
                    .get(&name)
                    .cloned()
                    .unwrap_or(Value::Null),
            );

            let handle = PluginHandle::new(name.clone(), unit, plugin);
            match handle.initialize(&ctx).await {
                Ok(()) => {
                    self.plugins.insert(name.clone(), Arc::new(handle));
                    self.order.write().push(name.clone());
                    tracing::info!(plugin = %name, unit = %unit, "Loaded plugin");
                    report.loaded.push(name);
                }
                Err(e) => {
                    tracing::error!(
                        plugin = %name,
                        unit = %unit,
                        error = %e,
                        "Failed to initialize plugin"
                    );
                    report.failures.push(DiscoveryFailure {
                        unit: unit.to_string(),
                        plugin: Some(name),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            duplicates = report.skipped_duplicates.len(),
            disabled = report.skipped_disabled.len(),
            failures = report.failures.len(),
            "Plugin discovery finished"
        );

        report
    }

    /// Shut down every live plugin in registration order and empty the registry
    ///
    /// Per-plugin failures are logged and do not stop the loop. The live set
    /// is cleared even when some shutdowns fail. Returns the number of failed
    /// shutdowns.
    pub async fn shutdown_all(&self) -> usize {
        let _guard = self.lifecycle.lock().await;
        let names = std::mem::take(&mut *self.order.write());
        let mut failures = 0;

        for name in &names {
            let Some(handle) = self.plugins.get(name).map(|entry| Arc::clone(entry.value()))
            else {
                continue;
            };

            match handle.shutdown().await {
                Ok(()) => tracing::info!(plugin = %name, "Shutdown plugin"),
                Err(e) => {
                    failures += 1;
                    tracing::error!(
                        plugin = %name,
                        unit = %handle.unit,
                        error = %e,
                        "Error shutting down plugin"
                    );
                }
            }
        }

        self.plugins.clear();
        failures
    }

    /// Get a plugin's status snapshot
    pub fn get(&self, name: &str) -> Result<PluginDescriptor, PluginError> {
        self.handle(name).map(|handle| handle.describe())
    }

    /// Snapshot of every live plugin keyed by identity
    pub fn list(&self) -> BTreeMap<String, PluginDescriptor> {
        self.plugins
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().describe()))
            .collect()
    }

    /// Live plugin identities in registration order
    pub fn names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// Check if a plugin is live
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Number of live plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry holds no live plugins
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run a command on a plugin
    ///
    /// # Errors
    ///
    /// - [`PluginError::NotFound`] if no live plugin has this identity
    /// - [`PluginError::NotInitialized`] if the plugin is not initialized;
    ///   the plugin is not invoked
    /// - [`PluginError::Internal`] / [`PluginError::Panic`] if the plugin
    ///   failed unexpectedly
    /// - [`PluginError::Timeout`] if a command timeout is configured and exceeded
    ///
    /// A plugin-reported failure (`success: false`) is an `Ok` result.
    pub async fn dispatch(
        &self,
        name: &str,
        command: PluginCommand,
    ) -> Result<PluginResponse, PluginError> {
        let handle = self.handle(name)?;

        if !handle.is_initialized() {
            return Err(PluginError::NotInitialized(name.to_string()));
        }

        let command_name = command.command.clone();
        let result = match self.config.command_timeout() {
            Some(limit) => tokio::time::timeout(limit, handle.handle_command(command))
                .await
                .unwrap_or_else(|_| Err(PluginError::Timeout(limit))),
            None => handle.handle_command(command).await,
        };

        match &result {
            Ok(_) => handle.entry.lock().record_success(),
            Err(e) => {
                tracing::error!(
                    plugin = %name,
                    command = %command_name,
                    error = %e,
                    "Error executing command on plugin"
                );
                handle.entry.lock().record_error(e.to_string());
            }
        }

        result
    }

    /// Get health metrics for a plugin
    pub fn metrics(&self, name: &str) -> Result<PluginMetrics, PluginError> {
        self.handle(name).map(|handle| handle.metrics())
    }

    fn handle(&self, name: &str) -> Result<Arc<PluginHandle>, PluginError> {
        self.plugins
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// Insert a plugin without initializing it
    #[cfg(test)]
    pub(crate) fn insert_uninitialized(&self, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();
        self.plugins.insert(
            name.clone(),
            Arc::new(PluginHandle::new(name.clone(), file!(), plugin)),
        );
        self.order.write().push(name);
    }
}
