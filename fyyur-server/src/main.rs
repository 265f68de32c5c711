//! fyyur-server - venue, artist and show listing service
//!
//! Startup order: arguments, config file, logging, database, HTTP server.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use fyyur_common::config::{CompiledDefaults, ConfigOverrides, ServiceConfig, TomlConfig};
use fyyur_common::db::init_database;
use fyyur_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for fyyur-server
#[derive(Parser, Debug)]
#[command(name = "fyyur-server")]
#[command(about = "Venue, artist and show listings over HTTP")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "FYYUR_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "FYYUR_DATABASE")]
    database: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "FYYUR_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FYYUR_PORT")]
    port: Option<u16>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = TomlConfig::discover(args.config.as_deref());
    let overrides = ConfigOverrides {
        database_path: args.database,
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(
        overrides,
        loaded.file,
        CompiledDefaults::for_current_platform(),
    );

    init_logging(&config.logging.level, config.logging.file.as_deref())?;

    // Build identification first, before any database delay
    info!(
        "Starting fyyur-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(warning) = loaded.warning {
        warn!("{}", warning);
    }
    if let Some(path) = &loaded.path {
        info!("Config file: {}", path.display());
    }

    info!("Database path: {}", config.database_path.display());
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let addr = config.bind_addr();
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("fyyur-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over the configured level. A bare level applies to this
/// service's crates and the request trace layer; anything containing `=`
/// or `,` is taken as a full filter directive.
fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(level)))?;

    let (stderr_layer, file_layer) = match file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false);
            (None, Some(layer))
        }
        None => (Some(fmt::layer()), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn filter_directive(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("fyyur_server={0},fyyur_common={0},tower_http={0}", level)
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_service_crates() {
        assert_eq!(
            filter_directive("debug"),
            "fyyur_server=debug,fyyur_common=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_directive_passes_through() {
        assert_eq!(filter_directive("fyyur_server=trace,sqlx=warn"), "fyyur_server=trace,sqlx=warn");
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::parse_from(["fyyur-server", "--port", "6000", "--database", "/tmp/f.db"]);
        assert_eq!(args.port, Some(6000));
        assert_eq!(args.database, Some(PathBuf::from("/tmp/f.db")));
    }
}
