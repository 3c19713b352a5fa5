//! Moving files inside the storage root.
//!
//! A move is tried as a rename first and falls back to copy-then-delete
//! when the rename fails for any reason other than a missing source.
//! Emptied source directories are then removed best-effort.

use serde::Serialize;
use tracing::{debug, warn};

use casehub_core::error::ErrorKind;
use casehub_core::result::AppResult;
use casehub_core::traits::storage::StorageProvider;

/// How a file reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMethod {
    /// Single rename.
    Renamed,
    /// Copied, then the source was deleted.
    CopiedAndDeleted,
    /// Copied, but the source could not be deleted and is still on disk.
    CopiedSourceRetained,
}

/// Result of the best-effort removal of emptied source directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CleanupOutcome {
    /// The source directory is outside the cleanup boundary.
    Skipped,
    /// `removed` directories were removed (zero when still in use).
    Cleaned { removed: usize },
    /// Removing a directory failed; the move itself still stands.
    Failed { path: String, reason: String },
}

/// Result of a successful [`move_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// How the bytes were moved.
    pub method: MoveMethod,
    /// What happened to the emptied source directories.
    pub cleanup: CleanupOutcome,
}

/// Parent directory of a storage-relative path (`""` for the root).
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

/// Move `from` to `to`, then remove emptied directories between the old
/// location and `cleanup_boundary` (exclusive).
///
/// Errors only when the file could not be placed at `to`. A missing source
/// is reported as `NotFound` without attempting the copy fallback.
pub async fn move_file(
    storage: &dyn StorageProvider,
    from: &str,
    to: &str,
    cleanup_boundary: &str,
) -> AppResult<MoveOutcome> {
    let method = match storage.rename(from, to).await {
        Ok(()) => MoveMethod::Renamed,
        Err(e) if e.kind == ErrorKind::NotFound => return Err(e),
        Err(e) => {
            debug!(from, to, error = %e, "Rename failed, falling back to copy");
            storage.copy(from, to).await?;
            match storage.delete(from).await {
                Ok(_) => MoveMethod::CopiedAndDeleted,
                Err(e) => {
                    warn!(from, to, error = %e, "Copied file but could not delete the source");
                    MoveMethod::CopiedSourceRetained
                }
            }
        }
    };

    let cleanup = if method == MoveMethod::CopiedSourceRetained {
        CleanupOutcome::Cleaned { removed: 0 }
    } else {
        remove_empty_dirs(storage, parent_dir(from), cleanup_boundary).await
    };

    Ok(MoveOutcome { method, cleanup })
}

/// Remove `start` and its ancestors while they are empty, stopping before
/// `boundary`. Directories not strictly below `boundary` are left alone.
pub async fn remove_empty_dirs(
    storage: &dyn StorageProvider,
    start: &str,
    boundary: &str,
) -> CleanupOutcome {
    let boundary = boundary.trim_end_matches('/');
    let is_below = |dir: &str| {
        if boundary.is_empty() {
            !dir.is_empty()
        } else {
            dir.len() > boundary.len()
                && dir.starts_with(boundary)
                && dir.as_bytes()[boundary.len()] == b'/'
        }
    };

    if !is_below(start) {
        return CleanupOutcome::Skipped;
    }

    let mut removed = 0;
    let mut dir = start;
    while is_below(dir) {
        match storage.remove_dir_if_empty(dir).await {
            Ok(true) => removed += 1,
            Ok(false) => break,
            Err(e) => {
                warn!(path = dir, error = %e, "Failed to remove empty directory");
                return CleanupOutcome::Failed {
                    path: dir.to_string(),
                    reason: e.to_string(),
                };
            }
        }
        dir = parent_dir(dir);
    }

    CleanupOutcome::Cleaned { removed }
}
