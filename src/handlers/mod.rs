//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint
//! - `docs` - API documentation page
//! - `plugins` - Plugin listing, status and command execution

pub mod api;
pub mod docs;
pub mod plugins;
