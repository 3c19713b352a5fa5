//! PostgreSQL case repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use casehub_core::config::FolderMergeStrategy;
use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_core::traits::Repository;
use casehub_core::types::{CaseId, FileRecordId, UserId};
use casehub_entity::{Case, CaseFileRecord, CaseStatus, FolderStructure, Gender};

use super::CaseRepository;

const CASE_COLUMNS: &str = "id, user_id, first_name, middle_name, last_name, patient_id, gender, \
     birth_date, status, notes, files, folder_structure, folder_name, created_at, updated_at";

/// Raw `cases` row.
#[derive(Debug, sqlx::FromRow)]
struct CaseRow {
    id: Uuid,
    user_id: Uuid,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    patient_id: String,
    gender: String,
    birth_date: NaiveDate,
    status: String,
    notes: Option<String>,
    files: Json<Vec<CaseFileRecord>>,
    folder_structure: Json<FolderStructure>,
    folder_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseRow> for Case {
    type Error = AppError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let gender = row.gender.parse::<Gender>().map_err(AppError::database)?;
        let status = row.status.parse::<CaseStatus>().map_err(AppError::database)?;
        Ok(Case {
            id: CaseId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            patient_id: row.patient_id,
            gender,
            birth_date: row.birth_date,
            status,
            notes: row.notes,
            files: row.files.0,
            folder_structure: row.folder_structure.0,
            folder_name: row.folder_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Case repository backed by the `cases` table.
#[derive(Debug, Clone)]
pub struct PgCaseRepository {
    pool: PgPool,
}

impl PgCaseRepository {
    /// Create a new case repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl Repository<Case, CaseId> for PgCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> AppResult<Option<Case>> {
        let row = sqlx::query_as::<_, CaseRow>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find case"))?;

        row.map(Case::try_from).transpose()
    }

    async fn create(&self, case: &Case) -> AppResult<Case> {
        let row = sqlx::query_as::<_, CaseRow>(&format!(
            "INSERT INTO cases ({CASE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {CASE_COLUMNS}"
        ))
        .bind(case.id.into_uuid())
        .bind(case.user_id.into_uuid())
        .bind(&case.first_name)
        .bind(&case.middle_name)
        .bind(&case.last_name)
        .bind(&case.patient_id)
        .bind(case.gender.as_str())
        .bind(case.birth_date)
        .bind(case.status.as_str())
        .bind(&case.notes)
        .bind(Json(&case.files))
        .bind(Json(&case.folder_structure))
        .bind(&case.folder_name)
        .bind(case.created_at)
        .bind(case.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .and_then(|d| d.code())
                .is_some_and(|code| code == "23505");
            if unique_violation {
                AppError::conflict(format!(
                    "A case for patient {} already exists",
                    case.patient_id
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create case", e)
            }
        })?;

        Case::try_from(row)
    }

    async fn delete(&self, id: &CaseId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete case"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    async fn find_owned_by(&self, id: CaseId, user_id: UserId) -> AppResult<Option<Case>> {
        let row = sqlx::query_as::<_, CaseRow>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find case"))?;

        row.map(Case::try_from).transpose()
    }

    async fn set_folder_name_if_absent(&self, id: CaseId, name: &str) -> AppResult<String> {
        let assigned: Option<String> = sqlx::query_scalar(
            "UPDATE cases SET folder_name = $2, updated_at = NOW() \
             WHERE id = $1 AND folder_name IS NULL RETURNING folder_name",
        )
        .bind(id.into_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to assign case folder name"))?;

        if let Some(name) = assigned {
            return Ok(name);
        }

        let existing: Option<Option<String>> =
            sqlx::query_scalar("SELECT folder_name FROM cases WHERE id = $1")
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err("Failed to read case folder name"))?;

        match existing {
            Some(Some(name)) => Ok(name),
            Some(None) => Err(AppError::conflict(format!(
                "Folder name for case {id} was cleared concurrently"
            ))),
            None => Err(AppError::not_found(format!("Case {id} not found"))),
        }
    }

    async fn append_files(&self, id: CaseId, files: &[CaseFileRecord]) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE cases SET files = files || COALESCE(( \
                 SELECT jsonb_agg(n.value ORDER BY n.ord) \
                 FROM jsonb_array_elements($2::jsonb) WITH ORDINALITY AS n(value, ord) \
                 WHERE NOT EXISTS ( \
                     SELECT 1 FROM jsonb_array_elements(cases.files) AS e \
                     WHERE e->>'id' = n.value->>'id')), '[]'::jsonb), \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.into_uuid())
        .bind(Json(files))
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to append case files"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Case {id} not found")));
        }
        Ok(())
    }

    async fn remove_file(&self, id: CaseId, file_id: FileRecordId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE cases SET files = COALESCE(( \
                 SELECT jsonb_agg(e.value ORDER BY e.ord) \
                 FROM jsonb_array_elements(files) WITH ORDINALITY AS e(value, ord) \
                 WHERE e.value->>'id' <> $2), '[]'::jsonb), \
             updated_at = NOW() \
             WHERE id = $1 AND EXISTS ( \
                 SELECT 1 FROM jsonb_array_elements(files) AS f WHERE f->>'id' = $2)",
        )
        .bind(id.into_uuid())
        .bind(file_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to remove case file"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn merge_folder_structure(
        &self,
        id: CaseId,
        incoming: &FolderStructure,
        strategy: FolderMergeStrategy,
    ) -> AppResult<FolderStructure> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let current: Option<Json<FolderStructure>> = sqlx::query_scalar(
            "SELECT folder_structure FROM cases WHERE id = $1 FOR UPDATE",
        )
        .bind(id.into_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to lock case folder structure"))?;

        let Some(Json(mut merged)) = current else {
            return Err(AppError::not_found(format!("Case {id} not found")));
        };
        merged.merge(incoming.clone(), strategy);

        sqlx::query("UPDATE cases SET folder_structure = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.into_uuid())
            .bind(Json(&merged))
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to store case folder structure"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit folder structure"))?;

        Ok(merged)
    }
}
