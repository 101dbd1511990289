//! API documentation page
//!
//! Served at `/docs`; this is the page the desktop shell opens.

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::state::AppState;

const DOCS_TEMPLATE: &str = include_str!("../../static/docs.html");

/// Render the documentation page for the configured API prefix
pub fn render_docs(api_prefix: &str, version: &str) -> String {
    DOCS_TEMPLATE
        .replace("{{API_PREFIX}}", api_prefix.trim_end_matches('/'))
        .replace("{{VERSION}}", version)
}

/// Documentation page handler
pub async fn docs_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_docs(
        &state.config.api_prefix,
        env!("CARGO_PKG_VERSION"),
    ))
}
