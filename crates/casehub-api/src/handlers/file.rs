//! File ingestion handlers: staging upload, association, and removal.

use std::collections::{HashMap, VecDeque};

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::extract::multipart::Field;
use bytes::Bytes;

use casehub_core::error::AppError;
use casehub_core::types::{CaseId, FileRecordId};
use casehub_entity::Case;
use casehub_service::UploadedFile;

use crate::dto::request::{AssociateRequest, validate_request};
use crate::dto::response::{ApiResponse, AssociateResponse, UploadResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

const RELATIVE_PATH_PREFIX: &str = "relativePath_";
const FOLDER_PATH_PREFIX: &str = "folderPath_";

/// A parsed upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Files in the order they were received, with their side-channel paths.
    pub files: Vec<UploadedFile>,
    /// Target case, when the client sent `caseId`.
    pub case_id: Option<CaseId>,
}

/// POST /api/v1/files/upload
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart).await?;

    let report = state
        .staging_service
        .stage(&auth, form.files, form.case_id)
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        count: report.count,
        data: report.files,
        folder_structure: report.folder_structure,
    }))
}

/// POST /api/v1/files/associate/{id}
pub async fn associate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(case_id): Path<CaseId>,
    Json(req): Json<AssociateRequest>,
) -> Result<Json<AssociateResponse>, AppError> {
    validate_request(&req)?;

    let report = state
        .association_service
        .associate(&auth, case_id, req.files, req.folder_structure)
        .await?;

    Ok(Json(AssociateResponse {
        success: true,
        data: report.case,
        applied: report.applied,
        skipped: report.skipped,
    }))
}

/// DELETE /api/v1/files/remove/{case_id}/{file_id}
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((case_id, file_id)): Path<(CaseId, FileRecordId)>,
) -> Result<Json<ApiResponse<Case>>, AppError> {
    let case = state.removal_service.remove(&auth, case_id, file_id).await?;
    Ok(Json(ApiResponse::ok(case)))
}

/// Reads a multipart upload form.
///
/// `relativePath_<name>` and `folderPath_<name>` are keyed by file name;
/// repeated values for the same name are paired with same-named files in
/// the order both arrive. A client-sent `folderStructure` is ignored since
/// the tree is rebuilt from the staged files.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut pending: Vec<(String, String, Bytes)> = Vec::new();
    let mut relative_paths: HashMap<String, VecDeque<String>> = HashMap::new();
    let mut folder_paths: HashMap<String, VecDeque<String>> = HashMap::new();
    let mut case_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "files" {
            let file_name = field
                .file_name()
                .map(String::from)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AppError::validation("Uploaded file has no name"))?;
            let mime_type = field
                .content_type()
                .map(String::from)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            pending.push((file_name, mime_type, data));
        } else if let Some(file_name) = name.strip_prefix(RELATIVE_PATH_PREFIX) {
            let file_name = file_name.to_string();
            let value = read_text(field).await?;
            relative_paths.entry(file_name).or_default().push_back(value);
        } else if let Some(file_name) = name.strip_prefix(FOLDER_PATH_PREFIX) {
            let file_name = file_name.to_string();
            let value = read_text(field).await?;
            folder_paths.entry(file_name).or_default().push_back(value);
        } else if name == "caseId" {
            let text = read_text(field).await?;
            let text = text.trim();
            if !text.is_empty() {
                case_id = Some(
                    text.parse::<CaseId>()
                        .map_err(|_| AppError::validation("Invalid caseId"))?,
                );
            }
        } else if name == "folderStructure" {
            tracing::debug!("Ignoring client-supplied folder structure");
        }
    }

    let files = pending
        .into_iter()
        .map(|(name, mime_type, data)| {
            let relative_path = relative_paths
                .get_mut(&name)
                .and_then(VecDeque::pop_front)
                .filter(|p| !p.is_empty());
            let folder_path = folder_paths
                .get_mut(&name)
                .and_then(VecDeque::pop_front)
                .filter(|p| !p.is_empty());
            UploadedFile {
                name,
                mime_type,
                data,
                relative_path,
                folder_path,
            }
        })
        .collect();

    Ok(UploadForm { files, case_id })
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}
