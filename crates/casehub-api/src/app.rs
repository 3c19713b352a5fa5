//! Application wiring: services, state, and the HTTP server loop.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use casehub_core::config::AppConfig;
use casehub_core::error::AppError;
use casehub_core::traits::StorageProvider;
use casehub_database::{CaseRepository, DatabasePool};
use casehub_service::{
    AssociationService, CaseFolderManager, CaseService, RemovalService, StagingService,
};
use casehub_storage::LocalStorageProvider;

use crate::router::build_router;
use crate::state::AppState;

/// Wires the services on top of a repository and a storage provider.
pub fn build_state(
    config: AppConfig,
    case_repo: Arc<dyn CaseRepository>,
    db_pool: Option<DatabasePool>,
    storage: Arc<dyn StorageProvider>,
) -> AppState {
    let storage_config = config.storage.clone();

    let folders = Arc::new(CaseFolderManager::new(
        Arc::clone(&case_repo),
        Arc::clone(&storage),
    ));

    let staging_service = Arc::new(StagingService::new(
        Arc::clone(&case_repo),
        Arc::clone(&storage),
        Arc::clone(&folders),
        storage_config.clone(),
    ));

    let association_service = Arc::new(AssociationService::new(
        Arc::clone(&case_repo),
        Arc::clone(&storage),
        Arc::clone(&folders),
        storage_config,
    ));

    let removal_service = Arc::new(RemovalService::new(
        Arc::clone(&case_repo),
        Arc::clone(&storage),
    ));

    let case_service = Arc::new(CaseService::new(
        Arc::clone(&case_repo),
        Arc::clone(&storage),
        Arc::clone(&staging_service),
        Arc::clone(&association_service),
    ));

    AppState {
        config: Arc::new(config),
        case_repo,
        db_pool,
        storage,
        staging_service,
        association_service,
        removal_service,
        case_service,
    }
}

/// Runs the CaseHub server until a shutdown signal arrives.
pub async fn run_server(
    config: AppConfig,
    case_repo: Arc<dyn CaseRepository>,
    db_pool: Option<DatabasePool>,
) -> Result<(), AppError> {
    tracing::info!("Starting CaseHub server...");

    // ── Step 1: Storage root ─────────────────────────────────────
    tracing::info!("Using storage root '{}'", config.storage.root_path);
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    if !storage.health_check().await? {
        return Err(AppError::storage(format!(
            "Storage root '{}' is not a directory",
            config.storage.root_path
        )));
    }

    // ── Step 2: Services and router ──────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_router(build_state(config, case_repo, db_pool, storage));

    // ── Step 3: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("CaseHub server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    // In-flight requests get `shutdown_grace_seconds` to finish.
    let deadline = async move {
        let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
        }
        _ = deadline => {
            tracing::warn!("Graceful shutdown timed out after {}s", grace.as_secs());
        }
    }

    tracing::info!("CaseHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
