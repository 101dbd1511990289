use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tracing::info;

use mcp_server::{
    ServerConfig, logging,
    plugin::{PluginRegistry, isolation::call_plugin_safely_value, registry::registered_constructors},
    routes,
    state::AppState,
};

/// MCP Server - local control panel hosting pluggable capability modules
#[derive(Parser, Debug)]
#[command(name = "mcp-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the plugins compiled into this binary
    Plugins,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    if let Some(Commands::Plugins) = cli.command {
        print_registered_plugins();
        return Ok(());
    }

    // Load configuration from file or environment
    let mut config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;

    let _log_guard = logging::init_logging(&config)?;
    logging::log_startup(&config);

    // Discover and initialize plugins
    let registry = Arc::new(PluginRegistry::new(config.plugins.clone()));
    let report = registry.discover_registered().await;
    info!(
        loaded = ?report.loaded,
        failed = report.failures.len(),
        "Plugins initialized"
    );

    let address = config.address();
    let rate_limit_rps = config.rate_limit_requests_per_second;
    let rate_limit_burst = config.rate_limit_burst_size;
    let rate_limited = config.is_rate_limited();

    // Create application state
    let app_state = AppState::with_registry(config, Arc::clone(&registry));

    // Configure rate limiting
    let governor_layer = if rate_limited {
        let governor_config = GovernorConfigBuilder::default()
            .per_second(rate_limit_rps as u64)
            .burst_size(rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow!("Failed to build rate limiter config"))?;
        Some(GovernorLayer::new(governor_config))
    } else {
        info!("Rate limiting disabled");
        None
    };

    let app = routes::create_app(app_state).layer(tower::util::option_layer(governor_layer));

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow!("Failed to bind {address}: {e}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped, shutting down plugins");
    let failures = registry.shutdown_all().await;
    if failures > 0 {
        tracing::warn!(failures, "Some plugins failed to shut down cleanly");
    }
    info!("MCP Server shut down successfully");

    Ok(())
}

/// Print the compiled-in registration table
fn print_registered_plugins() {
    for constructor in registered_constructors() {
        if constructor.is_reserved() {
            println!("{:<24} {} (reserved)", "-", constructor.unit);
            continue;
        }

        match call_plugin_safely_value(constructor.create) {
            Ok(plugin) => println!("{:<24} {}", plugin.name(), constructor.unit),
            Err(e) => println!("{:<24} {} ({e})", "<invalid>", constructor.unit),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
