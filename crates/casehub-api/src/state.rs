//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use casehub_core::config::AppConfig;
use casehub_core::traits::StorageProvider;
use casehub_database::{CaseRepository, DatabasePool};
use casehub_service::{AssociationService, CaseService, RemovalService, StagingService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Case persistence
    pub case_repo: Arc<dyn CaseRepository>,
    /// PostgreSQL pool; `None` when running on the in-memory repository
    pub db_pool: Option<DatabasePool>,
    /// Storage rooted at the configured storage directory
    pub storage: Arc<dyn StorageProvider>,

    // ── Services ─────────────────────────────────────────────
    /// Upload staging
    pub staging_service: Arc<StagingService>,
    /// Association of staged files with cases
    pub association_service: Arc<AssociationService>,
    /// Removal of files from cases
    pub removal_service: Arc<RemovalService>,
    /// Case lifecycle
    pub case_service: Arc<CaseService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage.provider_type())
            .field("database", &self.db_pool.is_some())
            .finish()
    }
}
