//! Staged file descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use casehub_core::types::FileRecordId;

use crate::case::CaseFileRecord;

/// One uploaded file waiting to be bound to a case.
///
/// Produced by the staging writer and sent back by the client when it
/// associates the batch with a case. Staged files that are never associated
/// stay on disk until removed by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedFile {
    /// Identifier that the resulting case file record will carry.
    pub id: FileRecordId,
    /// Original file name.
    pub name: String,
    /// Current location relative to the storage root.
    #[serde(alias = "path")]
    pub staging_path: String,
    /// Client-supplied relative path, possibly empty.
    #[serde(default)]
    pub relative_path: String,
    /// Parent directory of `relative_path`, possibly empty.
    #[serde(default, alias = "originalFolderPath")]
    pub folder_path: String,
    /// Bytes written.
    pub size: u64,
    /// Declared MIME type.
    #[serde(alias = "mimetype")]
    pub mime_type: String,
    /// When the upload was written.
    pub uploaded_at: DateTime<Utc>,
}

impl StagedFile {
    /// The staged file's own name on disk (last path segment).
    pub fn stored_file_name(&self) -> &str {
        self.staging_path
            .rsplit('/')
            .next()
            .unwrap_or(self.staging_path.as_str())
    }

    /// Folder segments of `folder_path`, ignoring empty and `.` parts.
    pub fn folder_segments(&self) -> Vec<&str> {
        self.folder_path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect()
    }

    /// Convert into a case file record located at `path`.
    pub fn into_record(self, path: String) -> CaseFileRecord {
        CaseFileRecord {
            id: self.id,
            name: self.name,
            path,
            relative_path: self.relative_path,
            size: self.size,
            mime_type: self.mime_type,
            uploaded_at: self.uploaded_at,
        }
    }
}
