//! B+R documentation HTTP server.

use std::net::SocketAddr;
use std::panic;
use std::path::PathBuf;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use brdoc_runtime::BrConfig;
use brdoc_server::{app, AppState, AuthConfig};

#[derive(Parser, Debug)]
#[command(name = "brdoc-server")]
#[command(about = "Serwer API dokumentacji B+R / IP Box", long_about = None)]
struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "81")]
    port: u16,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shared API key; omitting it disables authentication
    #[arg(long, env = "BR_API_KEY")]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Log panics before aborting.
fn setup_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        error!("Server panic: {}", panic_info);
        default_hook(panic_info);
    }));
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_panic_hook();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config = match &args.config {
        Some(path) => BrConfig::from_file(path)?,
        None => BrConfig::default(),
    };
    config.apply_env();

    let pool = match &config.database_url {
        Some(dsn) => match PgPoolOptions::new().max_connections(10).connect(dsn).await {
            Ok(pool) => {
                info!("database pool connected");
                Some(pool)
            }
            Err(e) => {
                error!(error = %e, "database unavailable, SQL sources degraded");
                None
            }
        },
        None => None,
    };

    let auth_config = match &args.api_key {
        Some(key) => AuthConfig::default().with_api_key(key.clone(), "system", &["read", "write"]),
        None => AuthConfig::default(),
    };

    let state = AppState::new(&config, pool);
    let router = app(state, auth_config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!(%addr, "brdoc server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
