//! Staging writer: puts an upload batch on disk and validates it.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use casehub_core::config::StorageConfig;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::StorageProvider;
use casehub_core::types::{CaseId, FileRecordId};
use casehub_database::CaseRepository;
use casehub_entity::{FolderStructure, StagedFile};
use casehub_storage::signature::{SIGNATURE_LEN, is_dicom, requires_signature};
use casehub_storage::transfer::{parent_dir, remove_empty_dirs};

use crate::context::RequestContext;
use crate::folder::{CaseFolderManager, resolve};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One file of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name as sent by the client.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub data: Bytes,
    /// Path of the file inside the folder the user picked, if any.
    pub relative_path: Option<String>,
    /// Parent folder of `relative_path`; derived from it when absent.
    pub folder_path: Option<String>,
}

/// Accepted files of a staged batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingReport {
    /// Descriptors of every written file, in upload order.
    pub files: Vec<StagedFile>,
    /// Number of accepted files.
    pub count: usize,
    /// Folder tree built from the files' relative paths.
    pub folder_structure: FolderStructure,
    /// Directory the batch was written under.
    pub target_dir: String,
}

/// Writes upload batches to staging (or straight into a case folder).
#[derive(Clone)]
pub struct StagingService {
    cases: Arc<dyn CaseRepository>,
    storage: Arc<dyn StorageProvider>,
    folders: Arc<CaseFolderManager>,
    config: StorageConfig,
}

impl std::fmt::Debug for StagingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingService")
            .field("staging_dir", &self.config.staging_dir)
            .finish()
    }
}

impl StagingService {
    /// Creates a new staging service.
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        storage: Arc<dyn StorageProvider>,
        folders: Arc<CaseFolderManager>,
        config: StorageConfig,
    ) -> Self {
        Self {
            cases,
            storage,
            folders,
            config,
        }
    }

    /// Write a batch to disk and validate every file.
    ///
    /// With `case_id` the batch lands directly in that case's folder (the
    /// folder is assigned if the case has none yet); otherwise it goes to a
    /// new batch directory in the staging area. Files that must carry the
    /// DICOM marker and do not make the whole batch fail: every file written
    /// for the batch is deleted again and the error names each invalid file.
    pub async fn stage(
        &self,
        ctx: &RequestContext,
        batch: Vec<UploadedFile>,
        case_id: Option<CaseId>,
    ) -> AppResult<StagingReport> {
        if batch.is_empty() {
            return Err(AppError::validation("Please upload at least one file"));
        }

        let limit = self.config.max_upload_size_bytes;
        if let Some(file) = batch.iter().find(|f| f.data.len() as u64 > limit) {
            return Err(AppError::validation(format!(
                "File {} exceeds the maximum upload size of {limit} bytes",
                file.name
            )));
        }

        let (target_dir, cleanup_boundary) = self.resolve_target(ctx, case_id).await?;

        let mut accepted: Vec<StagedFile> = Vec::with_capacity(batch.len());
        let mut invalid: Vec<String> = Vec::new();

        for file in batch {
            match self.write_one(&target_dir, file).await {
                Ok(WriteResult::Accepted(staged)) => accepted.push(staged),
                Ok(WriteResult::Invalid { name, path }) => {
                    warn!(
                        user_id = %ctx.user_id,
                        file = %name,
                        "Rejected upload without DICOM signature"
                    );
                    invalid.push(name);
                    self.discard(&path, &cleanup_boundary).await;
                }
                Err(e) => {
                    self.discard_batch(&accepted, &target_dir, &cleanup_boundary)
                        .await;
                    return Err(e);
                }
            }
        }

        if !invalid.is_empty() {
            self.discard_batch(&accepted, &target_dir, &cleanup_boundary)
                .await;
            return Err(AppError::validation(format!(
                "Invalid DICOM file(s): {}",
                invalid.join(", ")
            )));
        }

        let folder_structure = resolve(&accepted);

        info!(
            user_id = %ctx.user_id,
            case_id = ?case_id.map(|id| id.to_string()),
            target = %target_dir,
            file_count = accepted.len(),
            action = "files_uploaded",
            "Files staged"
        );

        Ok(StagingReport {
            count: accepted.len(),
            files: accepted,
            folder_structure,
            target_dir,
        })
    }

    /// Directory to write the batch under, and the directory above which
    /// emptied folders must not be removed.
    async fn resolve_target(
        &self,
        ctx: &RequestContext,
        case_id: Option<CaseId>,
    ) -> AppResult<(String, String)> {
        if let Some(case_id) = case_id {
            self.cases
                .find_owned_by(case_id, ctx.user_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;
            let folder = self.folders.ensure_folder(case_id).await?;
            return Ok((folder.clone(), folder));
        }

        let staging_segments: Vec<&str> = self.config.staging_dir.split('/').collect();
        let staging_root = self.folders.ensure_directory("", &staging_segments).await?;
        let batch_dir = format!(
            "upload_{}_{}",
            Utc::now().timestamp_millis(),
            short_token()
        );
        let target = self
            .folders
            .ensure_directory(&staging_root, &[batch_dir.as_str()])
            .await?;
        Ok((target, staging_root))
    }

    async fn write_one(&self, target_dir: &str, file: UploadedFile) -> AppResult<WriteResult> {
        let name = base_name(&file.name).to_string();
        if name.is_empty() {
            return Err(AppError::validation("Uploaded file has no name"));
        }

        let relative_path = file
            .relative_path
            .map(|p| p.replace('\\', "/"))
            .unwrap_or_default();
        let folder_path = match file.folder_path {
            Some(p) => p.replace('\\', "/").trim_matches('/').to_string(),
            None => parent_dir(&relative_path).to_string(),
        };

        let segments: Vec<&str> = folder_path.split('/').collect();
        let dir = self.folders.ensure_directory(target_dir, &segments).await?;
        let path = format!("{dir}/{}", unique_file_name(&name));

        let size = self.storage.write(&path, file.data).await?;

        if requires_signature(&name) {
            let prefix = match self.storage.read_prefix(&path, SIGNATURE_LEN).await {
                Ok(prefix) => prefix,
                Err(e) => {
                    self.discard(&path, target_dir).await;
                    return Err(e);
                }
            };
            if !is_dicom(&prefix) {
                return Ok(WriteResult::Invalid { name, path });
            }
        }

        let mime_type = if file.mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            file.mime_type
        };

        Ok(WriteResult::Accepted(StagedFile {
            id: FileRecordId::new(),
            name,
            staging_path: path,
            relative_path,
            folder_path,
            size,
            mime_type,
            uploaded_at: Utc::now(),
        }))
    }

    /// Delete everything a failed batch wrote, including its batch
    /// directory when it was created for this call.
    async fn discard_batch(&self, files: &[StagedFile], target_dir: &str, boundary: &str) {
        for file in files {
            self.discard(&file.staging_path, boundary).await;
        }
        remove_empty_dirs(self.storage.as_ref(), target_dir, boundary).await;
    }

    /// Delete a written file and any directories it leaves empty.
    async fn discard(&self, path: &str, boundary: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "Failed to delete rejected upload");
            return;
        }
        remove_empty_dirs(self.storage.as_ref(), parent_dir(path), boundary).await;
    }
}

enum WriteResult {
    Accepted(StagedFile),
    Invalid { name: String, path: String },
}

fn short_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(12);
    token
}

/// Last path segment of a client-supplied file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

/// `<stem>_<token><ext>` so that same-named uploads never overwrite each
/// other.
fn unique_file_name(name: &str) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };
    format!("{stem}_{}{ext}", short_token())
}
