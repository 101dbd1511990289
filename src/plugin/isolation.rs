//! Plugin Isolation and Panic Safety
//!
//! Plugin calls are wrapped in `catch_unwind` so a panicking plugin turns into
//! a [`PluginError::Panic`] instead of taking the server down.
//!
//! `catch_unwind` only catches unwinding panics. The release profile must not
//! set `panic = "abort"`.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, UnwindSafe, catch_unwind};
use std::time::Duration;

/// Plugin-specific error type
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No live plugin with this identity
    #[error("Plugin {0} not found")]
    NotFound(String),

    /// Plugin exists but is not initialized
    #[error("Plugin {0} is not initialized")]
    NotInitialized(String),

    /// Plugin initialization failed
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),

    /// Plugin shutdown failed
    #[error("Plugin shutdown failed: {0}")]
    ShutdownFailed(String),

    /// Plugin configuration error
    #[error("Plugin configuration error: {0}")]
    Configuration(String),

    /// Plugin panicked during execution
    #[error("Plugin panicked: {0}")]
    Panic(String),

    /// Command did not complete within the configured timeout
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected failure inside the plugin or the dispatch path
    #[error("Plugin internal error: {0}")]
    Internal(String),
}

/// Safely call a synchronous plugin function that returns a value directly
///
/// Used for plugin constructors, which may panic on malformed registrations.
pub fn call_plugin_safely_value<F, T>(plugin_fn: F) -> Result<T, PluginError>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(plugin_fn) {
        Ok(result) => Ok(result),
        Err(panic_info) => {
            let msg = extract_panic_message(&panic_info);
            tracing::error!(message = %msg, "Plugin panicked");
            Err(PluginError::Panic(msg))
        }
    }
}

/// Safely await a plugin future, preserving its error type
///
/// Panics raised while polling the future are caught and converted into
/// [`PluginError::Panic`]. Panics inside tasks the plugin spawns itself are
/// not caught here.
///
/// # Example
///
/// ```ignore
/// let response = call_plugin_safely_async(plugin.handle_command(command)).await?;
/// ```
pub async fn call_plugin_safely_async<Fut, T>(future: Fut) -> Result<T, PluginError>
where
    Fut: Future<Output = Result<T, PluginError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = extract_panic_message(&panic_info);
            tracing::error!(message = %msg, "Plugin panicked during async execution");
            Err(PluginError::Panic(msg))
        }
    }
}

/// Extract a human-readable message from panic info
///
/// Handles `&str` and `String` payloads and falls back to a generic message.
fn extract_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic (non-string payload)".to_string()
    }
}
