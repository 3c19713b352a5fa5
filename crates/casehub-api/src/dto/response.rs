//! Response DTOs.

use serde::{Deserialize, Serialize};

use casehub_entity::{Case, FolderStructure, StagedFile};
use casehub_service::{AppliedFile, SkippedFile};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response of a staged upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Number of files staged.
    pub count: usize,
    /// Staged file descriptors.
    pub data: Vec<StagedFile>,
    /// Folder tree built from the batch.
    pub folder_structure: FolderStructure,
}

/// Response of an association.
#[derive(Debug, Clone, Serialize)]
pub struct AssociateResponse {
    /// Always `true`.
    pub success: bool,
    /// The updated case.
    pub data: Case,
    /// Files that were recorded on the case.
    pub applied: Vec<AppliedFile>,
    /// Files that were left out, with the reason.
    pub skipped: Vec<SkippedFile>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Case repository status.
    pub database: String,
    /// Storage backend status.
    pub storage: String,
}
