pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod plugin;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use errors::{AppError, AppResult};
pub use plugin::{PluginCommand, PluginRegistry, PluginResponse};
pub use state::AppState;
