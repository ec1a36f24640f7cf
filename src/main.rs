//! Home portal server entry point.
//!
//! `homeportal serve` starts the HTTP server; `homeportal migrate` applies
//! pending database migrations and exits.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use portal_api::{AppState, run_server};
use portal_core::config::{AppConfig, StoreProvider};
use portal_core::error::AppError;
use portal_database::connection::DatabasePool;
use portal_database::migration::run_migrations;
use portal_database::{MemoryStore, PgStore, PortalStore};

/// Home portal server.
#[derive(Debug, Parser)]
#[command(name = "homeportal", version, about)]
struct Cli {
    /// Directory holding `default.toml` and environment overlays.
    #[arg(long, global = true, default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply on top of `default.toml`.
    #[arg(long, global = true, default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Apply pending migrations before serving (postgres only).
        #[arg(long)]
        migrate: bool,
    },
    /// Apply pending migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Command::Serve { migrate } => serve(config, migrate).await,
        Command::Migrate => apply_migrations(&config).await.map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn apply_migrations(config: &AppConfig) -> Result<usize, AppError> {
    if config.database.provider != StoreProvider::Postgres {
        return Err(AppError::configuration(
            "Migrations only apply to the postgres store",
        ));
    }
    let db = DatabasePool::connect(&config.database).await?;
    let applied = run_migrations(&db).await;
    db.close().await;
    applied
}

async fn serve(config: AppConfig, migrate_first: bool) -> Result<(), AppError> {
    tracing::info!(
        "Starting home portal v{} (store: {:?}, columns: {})",
        env!("CARGO_PKG_VERSION"),
        config.database.provider,
        config.home.columns
    );

    let store: Arc<dyn PortalStore> = match config.database.provider {
        StoreProvider::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if migrate_first {
                run_migrations(&db).await?;
            }
            Arc::new(PgStore::new(db))
        }
        StoreProvider::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    run_server(AppState::new(config, store)).await
}
