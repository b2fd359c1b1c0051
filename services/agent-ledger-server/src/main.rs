//! Agent Ledger Server
//!
//! Serves the spend ledger HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Development: in-memory store with demo data
//! agent-ledger-server --in-memory --seed
//!
//! # Production: PostgreSQL, JSON logs
//! DATABASE_URL=postgresql://... agent-ledger-server --log-format json
//!
//! # With config file
//! agent-ledger-server --config config/production.toml
//! ```
//!
//! # Environment Variables
//!
//! - `AGENT_LEDGER_CONFIG`: Path to config file
//! - `DATABASE_URL`: PostgreSQL connection URL
//! - `AGENT_LEDGER__<SECTION>__<KEY>`: any config value, e.g.
//!   `AGENT_LEDGER__LEDGER__UTC_OFFSET=+02:00`
//! - `RUST_LOG`: overrides the configured log filter

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agent_ledger_api::{create_router, ApiConfig, AppState};
use agent_ledger_db::{seed::seed_demo, Database, LedgerStore, MemoryLedgerStore};
use agent_ledger_types::{Clock, SystemClock};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Agent Ledger Server - spend tracking and enforcement for AI agents
#[derive(Parser, Debug)]
#[command(name = "agent-ledger-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "AGENT_LEDGER_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Use the in-memory store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// Load the demo dataset on startup (wipes existing data)
    #[arg(long)]
    seed: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.postgres_url = url;
        }
        if self.in_memory {
            config.ledger.in_memory = true;
        }
        if self.seed {
            config.ledger.seed = true;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Agent Ledger Server"
    );

    let offset = server_config.ledger.billing_offset()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(offset));
    tracing::info!(utc_offset = %offset, "Billing month boundaries configured");

    let store = init_store(&server_config).await?;

    if server_config.ledger.seed {
        let seeded = seed_demo(store.as_ref(), clock.current_window(), clock.now()).await?;
        tracing::info!(
            research_assistant = %seeded.research_assistant.id,
            code_generator = %seeded.code_generator.id,
            "Demo dataset loaded"
        );
    }

    let state = Arc::new(AppState::new(store, clock));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
        enable_swagger: server_config.api.enable_swagger,
    };

    let app = create_router(state, api_config);

    if server_config.metrics.enabled {
        start_metrics_exporter(server_config.metrics.port)?;
    }

    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    Ok(())
}

/// Pick and prepare the storage backend
async fn init_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    if config.ledger.in_memory {
        tracing::warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryLedgerStore::new()));
    }

    let db = Database::connect(&config.database.to_db_config()).await?;

    if config.database.run_migrations {
        db.migrate().await?;
    }

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(backend = health.backend, "Database health check passed");

    Ok(Arc::new(db))
}

/// Serve Prometheus metrics on their own port
fn start_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port, "Metrics exporter started");

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
///
/// Once the signal arrives, in-flight requests get `timeout` to finish before
/// the process exits regardless.
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!("Shutdown timeout elapsed, exiting");
        std::process::exit(1);
    });
}

// =============================================================================
// Tests
// =============================================================================
