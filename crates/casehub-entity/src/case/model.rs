//! Case entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use casehub_core::types::{CaseId, FileRecordId, UserId};

use crate::case::file_record::CaseFileRecord;
use crate::case::status::{CaseStatus, Gender};
use crate::folder::FolderStructure;

/// A patient case owned by a single user.
///
/// The ingestion pipeline only ever changes `files`, `folder_name` and
/// `folder_structure`; every other field belongs to case management.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Unique case identifier.
    pub id: CaseId,
    /// Owning user.
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Patient first name.
    pub first_name: String,
    /// Patient middle name.
    pub middle_name: Option<String>,
    /// Patient last name.
    pub last_name: String,
    /// External patient identifier.
    pub patient_id: String,
    /// Patient gender.
    pub gender: Gender,
    /// Patient birth date.
    pub birth_date: NaiveDate,
    /// Workflow status.
    pub status: CaseStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Files bound to this case, in association order.
    #[serde(default)]
    pub files: Vec<CaseFileRecord>,
    /// Cumulative folder tree uploaded for this case.
    #[serde(default)]
    pub folder_structure: FolderStructure,
    /// Stable on-disk folder name; assigned once.
    pub folder_name: Option<String>,
    /// When the case was created.
    pub created_at: DateTime<Utc>,
    /// When the case was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Build a new case record from creation data.
    pub fn new(user_id: UserId, data: CreateCase) -> Self {
        let now = Utc::now();
        Self {
            id: CaseId::new(),
            user_id,
            first_name: data.first_name,
            middle_name: data.middle_name,
            last_name: data.last_name,
            patient_id: data.patient_id,
            gender: data.gender,
            birth_date: data.birth_date,
            status: CaseStatus::default(),
            notes: data.notes,
            files: Vec::new(),
            folder_structure: FolderStructure::new(),
            folder_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Patient display name.
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Whether `user_id` owns this case.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Look up a file record by id.
    pub fn find_file(&self, file_id: FileRecordId) -> Option<&CaseFileRecord> {
        self.files.iter().find(|f| f.id == file_id)
    }

    /// Whether a file with this id is already bound to the case.
    pub fn has_file(&self, file_id: FileRecordId) -> bool {
        self.find_file(file_id).is_some()
    }
}

/// Data required to create a new case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCase {
    /// Patient first name.
    pub first_name: String,
    /// Patient middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Patient last name.
    pub last_name: String,
    /// External patient identifier.
    pub patient_id: String,
    /// Patient gender.
    pub gender: Gender,
    /// Patient birth date.
    pub birth_date: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}
