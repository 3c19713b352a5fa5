//! Case handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;

use casehub_core::error::AppError;
use casehub_core::types::CaseId;
use casehub_entity::Case;

use crate::dto::request::{CreateCaseRequest, validate_request};
use crate::dto::response::{ApiResponse, AssociateResponse};
use crate::extractors::AuthUser;
use crate::handlers::file::read_upload_form;
use crate::state::AppState;

/// POST /api/v1/cases
pub async fn create_case(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Case>>), AppError> {
    validate_request(&req)?;
    let case = state.case_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(case))))
}

/// GET /api/v1/cases/{id}
pub async fn get_case(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CaseId>,
) -> Result<Json<ApiResponse<Case>>, AppError> {
    let case = state.case_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(case)))
}

/// DELETE /api/v1/cases/{id}
pub async fn delete_case(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CaseId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    state.case_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({}))))
}

/// PUT /api/v1/cases/{id}/files
///
/// Stages the batch directly into the case folder and associates it.
pub async fn upload_case_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CaseId>,
    multipart: Multipart,
) -> Result<Json<AssociateResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    if form.case_id.is_some_and(|other| other != id) {
        return Err(AppError::validation("caseId does not match the URL"));
    }

    let report = state
        .case_service
        .upload_to_case(&auth, id, form.files)
        .await?;

    Ok(Json(AssociateResponse {
        success: true,
        data: report.case,
        applied: report.applied,
        skipped: report.skipped,
    }))
}
