//! File entry embedded in a case's file list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use casehub_core::types::FileRecordId;

/// A file bound to a case.
///
/// Once association succeeds, `path` points at a file physically present
/// under the case folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFileRecord {
    /// Identifier carried over from staging.
    pub id: FileRecordId,
    /// Original file name as uploaded.
    pub name: String,
    /// Location relative to the storage root.
    pub path: String,
    /// Client-side relative path (empty for loose files).
    #[serde(default)]
    pub relative_path: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME type.
    #[serde(alias = "mimetype")]
    pub mime_type: String,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}
