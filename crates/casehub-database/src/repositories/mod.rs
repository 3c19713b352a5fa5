//! Case repository trait and its implementations.

pub mod case;
pub mod memory;

use async_trait::async_trait;

use casehub_core::config::FolderMergeStrategy;
use casehub_core::result::AppResult;
use casehub_core::traits::Repository;
use casehub_core::types::{CaseId, FileRecordId, UserId};
use casehub_entity::{Case, CaseFileRecord, FolderStructure};

pub use case::PgCaseRepository;
pub use memory::MemoryCaseRepository;

/// Persistence operations the ingestion pipeline needs on a case.
///
/// Every mutating method is a single atomic step against the stored record
/// so that concurrent uploads for the same case cannot lose each other's
/// writes.
#[async_trait]
pub trait CaseRepository: Repository<Case, CaseId> {
    /// Find a case only if it belongs to `user_id`.
    async fn find_owned_by(&self, id: CaseId, user_id: UserId) -> AppResult<Option<Case>>;

    /// Store `name` as the case's folder name unless one is already set.
    ///
    /// Returns the folder name that is stored after the call, which is the
    /// pre-existing one if another writer got there first.
    async fn set_folder_name_if_absent(&self, id: CaseId, name: &str) -> AppResult<String>;

    /// Append file records, skipping any whose id is already present.
    async fn append_files(&self, id: CaseId, files: &[CaseFileRecord]) -> AppResult<()>;

    /// Drop the file record with `file_id`. Returns `false` when the case or
    /// the record does not exist.
    async fn remove_file(&self, id: CaseId, file_id: FileRecordId) -> AppResult<bool>;

    /// Merge `incoming` into the stored folder tree and return the result.
    async fn merge_folder_structure(
        &self,
        id: CaseId,
        incoming: &FolderStructure,
        strategy: FolderMergeStrategy,
    ) -> AppResult<FolderStructure>;
}
