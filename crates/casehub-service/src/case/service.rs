//! Case service: create, fetch, delete, and one-shot upload into a case.

use std::sync::Arc;

use tracing::{info, warn};

use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::StorageProvider;
use casehub_core::types::CaseId;
use casehub_database::CaseRepository;
use casehub_entity::{Case, CreateCase};

use crate::context::RequestContext;
use crate::file::{AssociationReport, AssociationService, StagingService, UploadedFile};

/// Case-level operations.
#[derive(Clone)]
pub struct CaseService {
    cases: Arc<dyn CaseRepository>,
    storage: Arc<dyn StorageProvider>,
    staging: Arc<StagingService>,
    association: Arc<AssociationService>,
}

impl std::fmt::Debug for CaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseService").finish()
    }
}

impl CaseService {
    /// Creates a new case service.
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        storage: Arc<dyn StorageProvider>,
        staging: Arc<StagingService>,
        association: Arc<AssociationService>,
    ) -> Self {
        Self {
            cases,
            storage,
            staging,
            association,
        }
    }

    /// Create a case owned by the current user.
    pub async fn create(&self, ctx: &RequestContext, data: CreateCase) -> AppResult<Case> {
        for (field, value) in [
            ("firstName", &data.first_name),
            ("lastName", &data.last_name),
            ("patientId", &data.patient_id),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{field} is required")));
            }
        }

        let case = self.cases.create(&Case::new(ctx.user_id, data)).await?;
        info!(
            user_id = %ctx.user_id,
            case_id = %case.id,
            action = "case_created",
            "Case created"
        );
        Ok(case)
    }

    /// Fetch a case owned by the current user.
    pub async fn get(&self, ctx: &RequestContext, case_id: CaseId) -> AppResult<Case> {
        self.cases
            .find_owned_by(case_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))
    }

    /// Delete a case, its folder, and any of its files stored elsewhere.
    pub async fn delete(&self, ctx: &RequestContext, case_id: CaseId) -> AppResult<()> {
        let case = self.get(ctx, case_id).await?;

        if let Some(folder) = &case.folder_name {
            if let Err(e) = self.storage.delete_dir(folder).await {
                warn!(case_id = %case_id, folder = %folder, error = %e, "Failed to delete case folder");
            }
        }
        for file in &case.files {
            let inside = case
                .folder_name
                .as_deref()
                .is_some_and(|folder| file.path.starts_with(&format!("{folder}/")));
            if inside {
                continue;
            }
            if let Err(e) = self.storage.delete(&file.path).await {
                warn!(case_id = %case_id, file_id = %file.id, error = %e, "Failed to delete case file");
            }
        }

        if !self.cases.delete(&case_id).await? {
            return Err(AppError::not_found(format!("Case not found with id {case_id}")));
        }

        info!(
            user_id = %ctx.user_id,
            case_id = %case_id,
            action = "case_deleted",
            "Case deleted"
        );
        Ok(())
    }

    /// Stage a batch straight into the case folder and associate it.
    pub async fn upload_to_case(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        batch: Vec<UploadedFile>,
    ) -> AppResult<AssociationReport> {
        let staged = self.staging.stage(ctx, batch, Some(case_id)).await?;
        self.association
            .associate(ctx, case_id, staged.files, Some(staged.folder_structure))
            .await
    }
}
