//! Plugin Capability Trait
//!
//! This module defines the capability set every plugin implements. The
//! registry never special-cases a concrete plugin; it only talks to this trait.
//!
//! Lifecycle bookkeeping (the `initialized` flag, call metrics) lives in the
//! registry's per-plugin handle, not in the plugin itself.

use async_trait::async_trait;

use super::command::{PluginCommand, PluginResponse};
use super::isolation::PluginError;
use super::lifecycle::PluginContext;

/// A capability module hosted by the server
///
/// # Example
///
/// ```ignore
/// use mcp_server::plugin::prelude::*;
///
/// #[derive(Default)]
/// pub struct EchoPlugin {
///     ready: bool,
/// }
///
/// #[async_trait]
/// impl Plugin for EchoPlugin {
///     fn name(&self) -> &str { "echo" }
///
///     async fn initialize(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
///         self.ready = true;
///         Ok(())
///     }
///
///     async fn shutdown(&mut self) -> Result<(), PluginError> {
///         self.ready = false;
///         Ok(())
///     }
///
///     async fn handle_command(&self, command: PluginCommand) -> Result<PluginResponse, PluginError> {
///         if !self.ready {
///             return Ok(PluginResponse::not_initialized());
///         }
///         match command.command.as_str() {
///             "echo" => Ok(PluginResponse::ok(command.parameters)),
///             other => Ok(PluginResponse::unknown_command(other)),
///         }
///     }
/// }
///
/// register_plugin!(EchoPlugin::default);
/// ```
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique, stable identity chosen by the implementation (e.g., "system_info")
    fn name(&self) -> &str;

    /// Acquire resources.
    ///
    /// Called exactly once by the registry during discovery. Returning an
    /// error drops this plugin only.
    async fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError>;

    /// Release resources acquired in [`Plugin::initialize`].
    ///
    /// Called exactly once during teardown, only on an initialized plugin.
    async fn shutdown(&mut self) -> Result<(), PluginError>;

    /// Run a named command.
    ///
    /// Unknown commands and bad parameters are reported through
    /// `Ok(PluginResponse { success: false, .. })`. `Err` is reserved for
    /// unexpected failures and surfaces to callers as an internal error.
    async fn handle_command(&self, command: PluginCommand) -> Result<PluginResponse, PluginError>;
}
