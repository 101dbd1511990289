//! Route configuration
//!
//! - `api` - Plugin endpoints, nested under the configured API prefix
//!
//! [`create_app`] assembles the complete application minus rate limiting,
//! which needs peer addresses and is layered on in `main`.

pub mod api;

use axum::{Router, routing::get};
use http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router with CORS and security headers
pub fn create_app(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::api::health_check))
        .route("/docs", get(handlers::docs::docs_page));

    let prefix = state.config.api_prefix.trim_end_matches('/').to_string();
    let app = if prefix.is_empty() {
        public_routes.merge(api::create_api_router())
    } else {
        public_routes.nest(&prefix, api::create_api_router())
    };

    let cors = cors_layer(state.config.cors_allowed_origins.as_deref());

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    app.with_state(state).layer(cors).layer(security_headers)
}

/// Configure CORS from a comma-separated origin list or "*"
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [AUTHORIZATION, CONTENT_TYPE];

    match origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(false),
        Some(origins) => {
            // Parse comma-separated origins
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(methods)
                .allow_headers(headers)
                .allow_credentials(true)
        }
        None => {
            tracing::info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            CorsLayer::new()
                .allow_methods(methods)
                .allow_headers(headers)
                .allow_credentials(false)
        }
    }
}
