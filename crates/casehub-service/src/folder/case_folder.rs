//! Stable per-case folders under the storage root.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::StorageProvider;
use casehub_core::types::CaseId;
use casehub_database::CaseRepository;

/// Folder name for a case created at `at`.
pub fn folder_name_for(case_id: CaseId, at: DateTime<Utc>) -> String {
    format!("case_{case_id}_{}", at.timestamp_millis())
}

/// Assigns case folder names and creates directories inside them.
#[derive(Clone)]
pub struct CaseFolderManager {
    cases: Arc<dyn CaseRepository>,
    storage: Arc<dyn StorageProvider>,
}

impl std::fmt::Debug for CaseFolderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseFolderManager")
            .field("storage", &self.storage.provider_type())
            .finish()
    }
}

impl CaseFolderManager {
    /// Creates a new case folder manager.
    pub fn new(cases: Arc<dyn CaseRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { cases, storage }
    }

    /// Return the case's folder name, assigning and creating it on first use.
    ///
    /// The case is read fresh on every call. When two callers race, the
    /// conditional write in the repository keeps the first name and both
    /// callers get it back.
    pub async fn ensure_folder(&self, case_id: CaseId) -> AppResult<String> {
        let case = self
            .cases
            .find_by_id(&case_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;

        let folder_name = match case.folder_name {
            Some(name) => name,
            None => {
                let candidate = folder_name_for(case_id, Utc::now());
                let stored = self
                    .cases
                    .set_folder_name_if_absent(case_id, &candidate)
                    .await?;
                if stored == candidate {
                    info!(case_id = %case_id, folder = %stored, "Assigned case folder");
                }
                stored
            }
        };

        if self.storage.create_dir(&folder_name).await? {
            debug!(case_id = %case_id, folder = %folder_name, "Created case folder");
        }

        Ok(folder_name)
    }

    /// Create `segments` one level at a time below `base` and return the
    /// resulting storage path.
    ///
    /// Levels that already exist are left untouched, so partially existing
    /// trees and concurrent creators are fine. Empty and `.` segments are
    /// ignored; `..` or embedded separators are rejected before anything is
    /// created.
    pub async fn ensure_directory(&self, base: &str, segments: &[&str]) -> AppResult<String> {
        let segments: Vec<&str> = segments
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if let Some(bad) = segments
            .iter()
            .find(|s| **s == ".." || s.contains(['/', '\\']))
        {
            return Err(AppError::validation(format!("Invalid folder segment: {bad}")));
        }

        let mut current = base.trim_end_matches('/').to_string();
        for segment in segments {
            current = if current.is_empty() {
                segment.to_string()
            } else {
                format!("{current}/{segment}")
            };
            self.storage.create_dir(&current).await?;
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::NaiveDate;

    use casehub_core::traits::Repository;
    use casehub_core::types::UserId;
    use casehub_database::MemoryCaseRepository;
    use casehub_entity::{Case, CreateCase, Gender};
    use casehub_storage::LocalStorageProvider;

    use super::*;

    async fn setup() -> (
        tempfile::TempDir,
        Arc<MemoryCaseRepository>,
        Arc<LocalStorageProvider>,
        CaseFolderManager,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryCaseRepository::new());
        let storage = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let manager = CaseFolderManager::new(repo.clone(), storage.clone());
        (dir, repo, storage, manager)
    }

    async fn create_case(repo: &MemoryCaseRepository) -> Case {
        let case = Case::new(
            UserId::new(),
            CreateCase {
                first_name: "Alan".into(),
                middle_name: None,
                last_name: "Turing".into(),
                patient_id: "P-7".into(),
                gender: Gender::Male,
                birth_date: NaiveDate::from_ymd_opt(1970, 6, 23).unwrap(),
                notes: None,
            },
        );
        repo.create(&case).await.unwrap()
    }

    #[test]
    fn test_folder_name_format() {
        let id = CaseId::new();
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(folder_name_for(id, at), format!("case_{id}_1700000000123"));
    }

    #[tokio::test]
    async fn test_ensure_folder_is_idempotent() {
        let (dir, repo, storage, manager) = setup().await;
        let case = create_case(&repo).await;

        let first = manager.ensure_folder(case.id).await.unwrap();
        assert!(first.starts_with(&format!("case_{}_", case.id)));
        assert!(dir.path().join(&first).is_dir());

        storage
            .write(&format!("{first}/marker.dcm"), Bytes::from_static(b"m"))
            .await
            .unwrap();

        let second = manager.ensure_folder(case.id).await.unwrap();
        assert_eq!(first, second);
        assert!(dir.path().join(&first).join("marker.dcm").exists());

        let stored = repo.find_by_id(&case.id).await.unwrap().unwrap();
        assert_eq!(stored.folder_name.as_deref(), Some(first.as_str()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_folder_agrees() {
        let (_dir, repo, _storage, manager) = setup().await;
        let case = create_case(&repo).await;

        let (a, b) = tokio::join!(manager.ensure_folder(case.id), manager.ensure_folder(case.id));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_folder_missing_case() {
        let (_dir, _repo, _storage, manager) = setup().await;
        let err = manager.ensure_folder(CaseId::new()).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_ensure_directory_creates_nested_levels() {
        let (dir, _repo, _storage, manager) = setup().await;

        let path = manager
            .ensure_directory("case_a", &["study", ".", "", "series1"])
            .await
            .unwrap();
        assert_eq!(path, "case_a/study/series1");
        assert!(dir.path().join("case_a/study/series1").is_dir());

        let again = manager
            .ensure_directory("case_a", &["study", "series1"])
            .await
            .unwrap();
        assert_eq!(again, path);
    }

    #[tokio::test]
    async fn test_ensure_directory_rejects_parent_segment() {
        let (_dir, _repo, storage, manager) = setup().await;
        let err = manager
            .ensure_directory("case_a", &["study", "..", "other"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        assert!(!storage.exists("case_a/study").await.unwrap());
    }
}
