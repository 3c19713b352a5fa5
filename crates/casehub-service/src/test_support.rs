//! Shared fixtures for service unit tests.

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;

use casehub_core::config::StorageConfig;
use casehub_core::traits::Repository;
use casehub_core::types::UserId;
use casehub_database::MemoryCaseRepository;
use casehub_entity::{Case, CreateCase, Gender};
use casehub_storage::LocalStorageProvider;
use casehub_storage::signature::{DICOM_MAGIC, PREAMBLE_LEN};

use crate::file::{AssociationService, RemovalService, StagingService, UploadedFile};
use crate::folder::CaseFolderManager;

pub struct TestEnv {
    pub dir: tempfile::TempDir,
    pub repo: Arc<MemoryCaseRepository>,
    pub storage: Arc<LocalStorageProvider>,
    pub staging: StagingService,
    pub association: AssociationService,
    pub removal: RemovalService,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_config(StorageConfig::default()).await
    }

    pub async fn with_config(mut config: StorageConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        config.root_path = dir.path().to_string_lossy().into_owned();
        let repo = Arc::new(MemoryCaseRepository::new());
        let storage = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let folders = Arc::new(CaseFolderManager::new(repo.clone(), storage.clone()));
        let staging = StagingService::new(
            repo.clone(),
            storage.clone(),
            folders.clone(),
            config.clone(),
        );
        let association =
            AssociationService::new(repo.clone(), storage.clone(), folders, config);
        let removal = RemovalService::new(repo.clone(), storage.clone());
        Self {
            dir,
            repo,
            storage,
            staging,
            association,
            removal,
        }
    }

    pub async fn create_case(&self, owner: UserId) -> Case {
        let case = Case::new(
            owner,
            CreateCase {
                first_name: "Rosalind".into(),
                middle_name: None,
                last_name: "Franklin".into(),
                patient_id: format!("P-{}", uuid::Uuid::new_v4().simple()),
                gender: Gender::Female,
                birth_date: NaiveDate::from_ymd_opt(1980, 7, 25).unwrap(),
                notes: None,
            },
        );
        self.repo.create(&case).await.unwrap()
    }

    /// Number of regular files anywhere under the storage root.
    pub fn file_count(&self) -> usize {
        fn walk(path: &std::path::Path) -> usize {
            std::fs::read_dir(path)
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .map(|e| {
                            let p = e.path();
                            if p.is_dir() { walk(&p) } else { 1 }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.dir.path())
    }
}

pub fn dicom_bytes(len: usize) -> Bytes {
    let mut buf = vec![0u8; len.max(PREAMBLE_LEN + DICOM_MAGIC.len())];
    buf[PREAMBLE_LEN..PREAMBLE_LEN + DICOM_MAGIC.len()].copy_from_slice(DICOM_MAGIC);
    Bytes::from(buf)
}

pub fn upload(name: &str, data: Bytes) -> UploadedFile {
    UploadedFile {
        name: name.to_string(),
        mime_type: "application/dicom".to_string(),
        data,
        relative_path: None,
        folder_path: None,
    }
}

pub fn upload_at(relative_path: &str, data: Bytes) -> UploadedFile {
    let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    UploadedFile {
        relative_path: Some(relative_path.to_string()),
        ..upload(name, data)
    }
}
