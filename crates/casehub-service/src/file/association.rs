//! Association reconciler: binds staged files to a case.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use casehub_core::config::StorageConfig;
use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_core::traits::StorageProvider;
use casehub_core::types::{CaseId, FileRecordId};
use casehub_database::CaseRepository;
use casehub_entity::{Case, CaseFileRecord, FolderStructure, StagedFile};
use casehub_storage::transfer::{CleanupOutcome, MoveOutcome, move_file};

use crate::context::RequestContext;
use crate::folder::CaseFolderManager;

/// How an applied file ended up in the case folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Already inside the case folder; nothing was moved.
    InPlace,
    /// Moved out of the staging area.
    Moved(MoveOutcome),
}

/// A descriptor that was bound to the case.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedFile {
    /// The record appended to the case.
    #[serde(flatten)]
    pub record: CaseFileRecord,
    /// How the file was placed.
    pub placement: Placement,
}

/// Why a descriptor was not bound to the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipReason {
    /// The case already has a file with this id or at this path (or the
    /// batch repeats one).
    AlreadyAssociated,
    /// Nothing exists at the staged path.
    SourceMissing,
    /// The staged path exists but is not a regular file.
    NotAFile,
    /// The staged path is neither in the staging area nor the case folder.
    OutsideStaging,
    /// Creating the destination or moving the file failed.
    MoveFailed { message: String },
}

/// A descriptor that was left out of the association.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    /// Descriptor id.
    pub id: FileRecordId,
    /// Original file name.
    pub name: String,
    /// Staged path that was not moved.
    pub path: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Outcome of an association call.
#[derive(Debug, Clone, Serialize)]
pub struct AssociationReport {
    /// The case as stored after the call.
    pub case: Case,
    /// Files bound by this call.
    pub applied: Vec<AppliedFile>,
    /// Files left out, with the reason.
    pub skipped: Vec<SkippedFile>,
}

/// Moves staged files into case folders and records them on the case.
#[derive(Clone)]
pub struct AssociationService {
    cases: Arc<dyn CaseRepository>,
    storage: Arc<dyn StorageProvider>,
    folders: Arc<CaseFolderManager>,
    config: StorageConfig,
}

impl std::fmt::Debug for AssociationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationService")
            .field("merge", &self.config.folder_structure_merge)
            .finish()
    }
}

impl AssociationService {
    /// Creates a new association service.
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

    /// Bind `files` to the case and merge `folder_structure` into it.
    ///
    /// Files that cannot be placed are reported in `skipped` and logged;
    /// they never fail the call. The returned case is re-read after all
    /// writes.
    pub async fn associate(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        files: Vec<StagedFile>,
        folder_structure: Option<FolderStructure>,
    ) -> AppResult<AssociationReport> {
        if files.is_empty() {
            return Err(AppError::validation("Please provide file data to associate"));
        }

        let case = self
            .cases
            .find_by_id(&case_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;
        if !case.is_owned_by(ctx.user_id) {
            return Err(AppError::authorization(format!(
                "Not authorized to modify case {case_id}"
            )));
        }

        let folder = self.folders.ensure_folder(case_id).await?;

        let mut seen = HashSet::new();
        let mut claimed: HashSet<String> = case.files.iter().map(|f| f.path.clone()).collect();
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            if case.has_file(file.id) || !seen.insert(file.id) {
                debug!(case_id = %case_id, file_id = %file.id, "File already associated");
                skipped.push(skip(file, SkipReason::AlreadyAssociated));
                continue;
            }

            match self.place(&folder, &file, &claimed).await {
                Ok((path, placement)) => {
                    claimed.insert(path.clone());
                    if let Placement::Moved(MoveOutcome {
                        cleanup: CleanupOutcome::Failed { path: dir, reason },
                        ..
                    }) = &placement
                    {
                        warn!(
                            case_id = %case_id,
                            file_id = %file.id,
                            dir = %dir,
                            reason = %reason,
                            "Moved file but left its staging directory behind"
                        );
                    }
                    applied.push(AppliedFile {
                        record: file.into_record(path),
                        placement,
                    });
                }
                Err(reason) => {
                    warn!(
                        user_id = %ctx.user_id,
                        case_id = %case_id,
                        file_id = %file.id,
                        path = %file.staging_path,
                        reason = ?reason,
                        action = "associate_skipped",
                        "Skipped file during association"
                    );
                    skipped.push(skip(file, reason));
                }
            }
        }

        if !applied.is_empty() {
            let records: Vec<CaseFileRecord> = applied.iter().map(|a| a.record.clone()).collect();
            self.cases.append_files(case_id, &records).await?;
        }

        if let Some(structure) = folder_structure.filter(|s| !s.is_empty()) {
            self.cases
                .merge_folder_structure(case_id, &structure, self.config.folder_structure_merge)
                .await?;
        }

        let case = self
            .cases
            .find_by_id(&case_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case not found with id {case_id}")))?;

        info!(
            user_id = %ctx.user_id,
            case_id = %case_id,
            applied = applied.len(),
            skipped = skipped.len(),
            action = "files_associated",
            "Files associated with case"
        );

        Ok(AssociationReport {
            case,
            applied,
            skipped,
        })
    }

    /// Put one staged file into the case folder, returning its final path.
    async fn place(
        &self,
        folder: &str,
        file: &StagedFile,
        claimed: &HashSet<String>,
    ) -> Result<(String, Placement), SkipReason> {
        let source = file.staging_path.trim_start_matches('/');
        let staging_root = self.config.staging_dir.trim_matches('/');

        if is_under(source, folder) {
            if claimed.contains(source) {
                return Err(SkipReason::AlreadyAssociated);
            }
            self.check_regular_file(source).await?;
            return Ok((source.to_string(), Placement::InPlace));
        }
        if !is_under(source, staging_root) {
            return Err(SkipReason::OutsideStaging);
        }
        self.check_regular_file(source).await?;

        let segments = file.folder_segments();
        let dest_dir = self
            .folders
            .ensure_directory(folder, &segments)
            .await
            .map_err(move_failed)?;
        let dest = format!("{dest_dir}/{}", file.stored_file_name());
        if claimed.contains(&dest) {
            return Err(SkipReason::AlreadyAssociated);
        }

        match move_file(self.storage.as_ref(), source, &dest, staging_root).await {
            Ok(outcome) => Ok((dest, Placement::Moved(outcome))),
            Err(e) if e.kind == ErrorKind::NotFound => Err(SkipReason::SourceMissing),
            Err(e) => Err(move_failed(e)),
        }
    }

    async fn check_regular_file(&self, path: &str) -> Result<(), SkipReason> {
        match self.storage.is_file(path).await {
            Ok(true) => Ok(()),
            Ok(false) => match self.storage.exists(path).await {
                Ok(true) => Err(SkipReason::NotAFile),
                Ok(false) => Err(SkipReason::SourceMissing),
                Err(e) => Err(move_failed(e)),
            },
            Err(e) => Err(move_failed(e)),
        }
    }
}

fn skip(file: StagedFile, reason: SkipReason) -> SkippedFile {
    SkippedFile {
        id: file.id,
        name: file.name,
        path: file.staging_path,
        reason,
    }
}

fn move_failed(e: AppError) -> SkipReason {
    SkipReason::MoveFailed {
        message: e.to_string(),
    }
}

/// Whether `path` lies strictly inside directory `dir`.
fn is_under(path: &str, dir: &str) -> bool {
    !dir.is_empty()
        && path.len() > dir.len() + 1
        && path.starts_with(dir)
        && path.as_bytes()[dir.len()] == b'/'
}
