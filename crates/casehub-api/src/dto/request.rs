//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use casehub_core::error::AppError;
use casehub_entity::{CreateCase, FolderStructure, Gender, StagedFile};

/// Body of `POST /api/v1/files/associate/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssociateRequest {
    /// Staged files returned by a previous upload.
    #[validate(length(min = 1, message = "No files provided"))]
    pub files: Vec<StagedFile>,
    /// Folder tree to merge into the case.
    #[serde(default)]
    pub folder_structure: Option<FolderStructure>,
}

/// Body of `POST /api/v1/cases`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    /// Patient first name.
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    /// Patient middle name.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub middle_name: Option<String>,
    /// Patient last name.
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    /// External patient identifier.
    #[validate(length(min = 1, message = "Patient ID is required"))]
    pub patient_id: String,
    /// Patient gender.
    pub gender: Gender,
    /// Patient birth date.
    pub birth_date: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl From<CreateCaseRequest> for CreateCase {
    fn from(req: CreateCaseRequest) -> Self {
        CreateCase {
            first_name: req.first_name,
            middle_name: req.middle_name,
            last_name: req.last_name,
            patient_id: req.patient_id,
            gender: req.gender,
            birth_date: req.birth_date,
            notes: req.notes,
        }
    }
}

/// Runs `validator` rules and maps failures to a validation error.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {}", e)))
}
