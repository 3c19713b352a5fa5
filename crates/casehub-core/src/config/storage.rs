//! Case storage configuration.

use serde::{Deserialize, Serialize};

/// How an incoming folder structure is combined with the one already stored
/// on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderMergeStrategy {
    /// Incoming top-level folders replace same-named existing ones.
    #[default]
    Shallow,
    /// Same-named folders are merged recursively; files are unioned by id.
    Deep,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one sub-directory per case.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Directory (relative to `root_path`) used for batch staging folders.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// Maximum size of a single uploaded file in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Merge semantics for case folder-structure metadata.
    #[serde(default)]
    pub folder_structure_merge: FolderMergeStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            staging_dir: default_staging_dir(),
            max_upload_size_bytes: default_max_upload(),
            folder_structure_merge: FolderMergeStrategy::default(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}

fn default_staging_dir() -> String {
    "_staging".to_string()
}

fn default_max_upload() -> u64 {
    52_428_800 // 50 MB
}
