//! Plugin System for the MCP Server
//!
//! This module hosts pluggable capability modules behind a uniform command
//! API:
//! - Compile-time plugin registration (`inventory`)
//! - Discovery, filtering and initialization at startup
//! - Panic-isolated command dispatch
//! - Ordered teardown
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Plugin Registration                          │
//! │  register_plugin! ──▶ inventory table ──▶ PluginRegistry (DashMap) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ## Using the Registry
//!
//! ```ignore
//! use mcp_server::plugin::prelude::*;
//!
//! let registry = PluginRegistry::new(config.plugins.clone());
//! registry.discover_registered().await;
//!
//! let response = registry
//!     .dispatch("system_info", PluginCommand::new("get_cpu_info"))
//!     .await?;
//! ```

pub mod builtin;
pub mod capabilities;
pub mod command;
pub mod isolation;
pub mod lifecycle;
#[macro_use]
pub mod macros;
pub mod metadata;
pub mod registry;

// Re-exports for convenience
pub use capabilities::Plugin;
pub use command::{PluginCommand, PluginResponse};
pub use isolation::PluginError;
pub use lifecycle::{PluginContext, PluginState};
pub use metadata::{PluginDescriptor, PluginMetrics};
pub use registry::{DiscoveryReport, PluginConstructor, PluginRegistry};

/// Prelude module for convenient imports
///
/// Use this for plugin development:
/// ```ignore
/// use mcp_server::plugin::prelude::*;
/// ```
pub mod prelude {
    pub use super::capabilities::Plugin;
    pub use super::command::{PluginCommand, PluginResponse};
    pub use super::isolation::PluginError;
    pub use super::lifecycle::PluginContext;
    pub use super::metadata::PluginDescriptor;
    pub use super::registry::{PluginConstructor, PluginRegistry};

    // Re-export commonly needed external crates
    pub use async_trait::async_trait;
    pub use inventory;
    pub use serde_json::{Map, Value, json};
    pub use std::sync::Arc;
}
