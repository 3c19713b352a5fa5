//! Removal reconciler: drops a file from a case and from disk.

use std::sync::Arc;

use tracing::{info, warn};

use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::StorageProvider;
use casehub_core::types::{CaseId, FileRecordId};
use casehub_database::CaseRepository;
use casehub_entity::Case;
use casehub_storage::transfer::{parent_dir, remove_empty_dirs};

use crate::context::RequestContext;

/// Removes file records from cases together with their artifacts.
#[derive(Clone)]
pub struct RemovalService {
    cases: Arc<dyn CaseRepository>,
    storage: Arc<dyn StorageProvider>,
}

impl std::fmt::Debug for RemovalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalService").finish()
    }
}

impl RemovalService {
    /// Creates a new removal service.
    pub fn new(cases: Arc<dyn CaseRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { cases, storage }
    }

    /// Remove file `file_id` from case `case_id`.
    ///
    /// The artifact on disk is deleted first; a missing artifact or a failed
    /// delete is logged and does not stop the record from being removed.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        file_id: FileRecordId,
    ) -> AppResult<Case> {
        let case = self
            .cases
            .find_owned_by(case_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;
        let record = case
            .find_file(file_id)
            .ok_or_else(|| AppError::not_found(format!("File not found with id {file_id}")))?;

        match self.storage.delete(&record.path).await {
            Ok(true) => {
                if let Some(folder) = &case.folder_name {
                    remove_empty_dirs(self.storage.as_ref(), parent_dir(&record.path), folder)
                        .await;
                }
            }
            Ok(false) => {
                info!(
                    case_id = %case_id,
                    file_id = %file_id,
                    path = %record.path,
                    "File artifact already missing"
                );
            }
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id,
                    case_id = %case_id,
                    file_id = %file_id,
                    error = %e,
                    action = "delete_file_failed",
                    "Failed to delete physical file"
                );
            }
        }

        if !self.cases.remove_file(case_id, file_id).await? {
            return Err(AppError::not_found(format!(
                "File not found with id {file_id}"
            )));
        }

        let case = self
            .cases
            .find_owned_by(case_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;

        info!(
            user_id = %ctx.user_id,
            case_id = %case_id,
            file_id = %file_id,
            action = "file_removed",
            "File removed from case"
        );

        Ok(case)
    }
}
