//! CaseHub Server: patient case DICOM ingestion service
//!
//! Main entry point that loads configuration, selects the case repository,
//! and starts the HTTP server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use casehub_core::config::{AppConfig, LogFormat};
use casehub_core::error::AppError;
use casehub_database::{CaseRepository, DatabasePool, MemoryCaseRepository, PgCaseRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `CASEHUB_CONFIG_DIR` (default `config`) and
/// the `CASEHUB_ENV` overlay.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_dir = std::env::var("CASEHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("CASEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Compact => {
            fmt().compact().with_env_filter(filter).init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CaseHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Case repository ──────────────────────────────────
    let (case_repo, db_pool): (Arc<dyn CaseRepository>, Option<DatabasePool>) =
        if config.database.is_memory() {
            tracing::warn!("Using in-memory case repository; data is lost on shutdown");
            let repo: Arc<dyn CaseRepository> = Arc::new(MemoryCaseRepository::new());
            (repo, None)
        } else {
            tracing::info!("Connecting to database...");
            let db_pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            casehub_database::migration::run_migrations(db_pool.pool()).await?;
            tracing::info!("Database migrations complete");

            let repo: Arc<dyn CaseRepository> =
                Arc::new(PgCaseRepository::new(db_pool.pool().clone()));
            (repo, Some(db_pool))
        };

    // ── Step 2: HTTP server ──────────────────────────────────────
    let result = casehub_api::run_server(config, case_repo, db_pool.clone()).await;

    if let Some(db_pool) = db_pool {
        db_pool.close().await;
    }

    result
}
