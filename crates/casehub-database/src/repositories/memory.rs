//! In-memory case repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use casehub_core::config::FolderMergeStrategy;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::Repository;
use casehub_core::types::{CaseId, FileRecordId, UserId};
use casehub_entity::{Case, CaseFileRecord, FolderStructure};

use super::CaseRepository;

/// Case repository holding records in a process-local map.
///
/// Each operation runs under the map's write lock, which gives the same
/// per-call atomicity as the PostgreSQL statements.
#[derive(Debug, Default)]
pub struct MemoryCaseRepository {
    cases: RwLock<HashMap<CaseId, Case>>,
}

impl MemoryCaseRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cases.
    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    /// Whether no cases are stored.
    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }
}

#[async_trait]
impl Repository<Case, CaseId> for MemoryCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> AppResult<Option<Case>> {
        Ok(self.cases.read().await.get(id).cloned())
    }

    async fn create(&self, case: &Case) -> AppResult<Case> {
        let mut cases = self.cases.write().await;
        if cases.contains_key(&case.id) {
            return Err(AppError::conflict(format!("Case {} already exists", case.id)));
        }
        if cases.values().any(|c| c.patient_id == case.patient_id) {
            return Err(AppError::conflict(format!(
                "A case for patient {} already exists",
                case.patient_id
            )));
        }
        cases.insert(case.id, case.clone());
        Ok(case.clone())
    }

    async fn delete(&self, id: &CaseId) -> AppResult<bool> {
        Ok(self.cases.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl CaseRepository for MemoryCaseRepository {
    async fn find_owned_by(&self, id: CaseId, user_id: UserId) -> AppResult<Option<Case>> {
        Ok(self
            .cases
            .read()
            .await
            .get(&id)
            .filter(|c| c.is_owned_by(user_id))
            .cloned())
    }

    async fn set_folder_name_if_absent(&self, id: CaseId, name: &str) -> AppResult<String> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;
        if let Some(existing) = &case.folder_name {
            return Ok(existing.clone());
        }
        case.folder_name = Some(name.to_string());
        case.updated_at = Utc::now();
        Ok(name.to_string())
    }

    async fn append_files(&self, id: CaseId, files: &[CaseFileRecord]) -> AppResult<()> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;
        for file in files {
            if !case.has_file(file.id) {
                case.files.push(file.clone());
            }
        }
        case.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_file(&self, id: CaseId, file_id: FileRecordId) -> AppResult<bool> {
        let mut cases = self.cases.write().await;
        let Some(case) = cases.get_mut(&id) else {
            return Ok(false);
        };
        let before = case.files.len();
        case.files.retain(|f| f.id != file_id);
        let removed = case.files.len() != before;
        if removed {
            case.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn merge_folder_structure(
        &self,
        id: CaseId,
        incoming: &FolderStructure,
        strategy: FolderMergeStrategy,
    ) -> AppResult<FolderStructure> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;
        case.folder_structure.merge(incoming.clone(), strategy);
        case.updated_at = Utc::now();
        Ok(case.folder_structure.clone())
    }
}
