//! Plugin REST Endpoints
//!
//! # Endpoints
//!
//! - `GET /plugins` - List live plugins and their status
//! - `GET /plugins/{name}` - Get a single plugin's status
//! - `GET /plugins/{name}/health` - Get plugin call metrics
//! - `POST /plugins/{name}/command` - Run a command on a plugin

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::plugin::{PluginCommand, PluginDescriptor, PluginMetrics, PluginResponse};
use crate::state::AppState;

/// Health status response
#[derive(Debug, Serialize)]
pub struct PluginHealthResponse {
    /// Plugin identity
    pub name: String,
    /// Health status ("healthy", "degraded" or "unhealthy")
    pub health: String,
    /// Call metrics
    pub details: PluginMetrics,
}

/// List all live plugins keyed by identity
pub async fn list_plugins(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, PluginDescriptor>> {
    Json(state.registry.list())
}

/// Get a plugin's status
pub async fn get_plugin_info(
    State(state): State<Arc<AppState>>,
    Path(plugin_name): Path<String>,
) -> AppResult<Json<PluginDescriptor>> {
    Ok(Json(state.registry.get(&plugin_name)?))
}

/// Get plugin health status
pub async fn get_plugin_health(
    State(state): State<Arc<AppState>>,
    Path(plugin_name): Path<String>,
) -> AppResult<Json<PluginHealthResponse>> {
    let metrics = state.registry.metrics(&plugin_name)?;

    Ok(Json(PluginHealthResponse {
        name: plugin_name,
        health: metrics.health().to_string(),
        details: metrics,
    }))
}

/// Execute a command on a plugin
///
/// A plugin-reported failure is returned with status 200 and `success: false`.
/// The plugin is looked up before the body is checked, so an unknown plugin
/// is always a 404 and a malformed envelope for a known one is a 422.
pub async fn execute_plugin_command(
    State(state): State<Arc<AppState>>,
    Path(plugin_name): Path<String>,
    payload: Result<Json<PluginCommand>, JsonRejection>,
) -> AppResult<Json<PluginResponse>> {
    state.registry.get(&plugin_name)?;
    let Json(command) =
        payload.map_err(|rejection| AppError::InvalidCommand(rejection.body_text()))?;

    tracing::debug!(plugin = %plugin_name, command = %command.command, "Dispatching command");
    let response = state.registry.dispatch(&plugin_name, command).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::plugin::builtin::SystemInfoPlugin;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_command_on_uninitialized_plugin_is_bad_request() {
        let state = AppState::new(ServerConfig::default());
        state
            .registry
            .insert_uninitialized(Box::new(SystemInfoPlugin::default()));

        let result = execute_plugin_command(
            State(Arc::clone(&state)),
            Path("system_info".to_string()),
            Ok(Json(PluginCommand::new("get_memory_info"))),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["detail"], "Plugin system_info is not initialized");
    }

    #[tokio::test]
    async fn test_list_reports_uninitialized_plugin() {
        let state = AppState::new(ServerConfig::default());
        state
            .registry
            .insert_uninitialized(Box::new(SystemInfoPlugin::default()));

        let Json(listed) = list_plugins(State(state)).await;
        assert_eq!(
            listed.get("system_info"),
            Some(&PluginDescriptor::new("system_info", false))
        );
    }
}
