use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::plugins;
use crate::state::AppState;
use std::sync::Arc;

/// Create the plugin API router
///
/// Mounted under the configured `api_prefix` by [`create_app`](super::create_app).
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plugins", get(plugins::list_plugins))
        .route("/plugins/{plugin_name}", get(plugins::get_plugin_info))
        .route(
            "/plugins/{plugin_name}/health",
            get(plugins::get_plugin_health),
        )
        .route(
            "/plugins/{plugin_name}/command",
            post(plugins::execute_plugin_command),
        )
        .layer(TraceLayer::new_for_http())
}
