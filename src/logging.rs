//! Tracing setup
//!
//! Logs go to stdout and, when `log_file` is configured, to a file through a
//! non-blocking writer. `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the file writer flushing until dropped. Hold it for the lifetime of `main`.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Build the filter from `RUST_LOG` if set, else from the configured level
pub fn env_filter(default_directive: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(default_directive).ok())
        .unwrap_or_else(|| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber
pub fn init_logging(config: &ServerConfig) -> Result<LogGuard, LoggingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = env_filter(&config.log_level, rust_log.as_deref());

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(true);

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard { _guard: guard })
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "mcp-server.log".into());

    std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
        path: dir.display().to_string(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Log the startup banner
pub fn log_startup(config: &ServerConfig) {
    tracing::info!("=== MCP Server Start ===");
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Version");
    tracing::info!(
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "Platform"
    );
    if let Ok(cwd) = std::env::current_dir() {
        tracing::info!(path = %cwd.display(), "Working directory");
    }
    if let Some(log_file) = &config.log_file {
        tracing::info!(path = %log_file.display(), "Log file");
    }
}
