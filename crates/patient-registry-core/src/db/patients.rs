//! Patient database operations.

use log::{debug, error, info, warn};
use rusqlite::{ffi, params, Row};
use thiserror::Error;

use super::{Database, DbError};
use crate::export::RosterExport;
use crate::identity::mask_document;
use crate::models::{parse_birth_date, PatientRecord, ValidationError};

const PATIENT_SELECT_SQL: &str = r#"
    SELECT document, name, surname, birth_date, hospitalization_count
    FROM patients
"#;

/// Repository errors.
///
/// "Not found" is never an error here: lookups return `None`, deletes
/// return `0` and increments return `false`.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("A patient with document {0} already exists")]
    DuplicateKey(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Invalid persisted patient data: {0}")]
    InvalidData(String),

    #[error("{count} rows share document {document}")]
    Inconsistent { document: String, count: usize },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Storage(DbError::Sqlite(e))
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Patient CRUD over a borrowed database connection.
///
/// Each call runs its own statement; no cursor outlives a call.
pub struct PatientRepository<'a> {
    db: &'a Database,
}

impl<'a> PatientRepository<'a> {
    /// Create a repository over an open database.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new patient with a zero hospitalization count.
    ///
    /// Rejects with `DuplicateKey` when the document is already stored,
    /// whether caught by the existence check or by the primary key.
    pub fn insert(&self, record: &PatientRecord) -> RepoResult<()> {
        if record.validated_document().is_none() {
            return Err(ValidationError::InvalidDocument(record.document().to_string()).into());
        }

        if self.exists_by_document(record.document())? {
            warn!(
                "event=patient_insert module=repo status=rejected reason=duplicate document={}",
                mask_document(record.document())
            );
            return Err(RepositoryError::DuplicateKey(record.document().to_string()));
        }

        self.write(record)
    }

    fn write(&self, record: &PatientRecord) -> RepoResult<()> {
        let result = self.db.conn().execute(
            r#"
            INSERT INTO patients (document, name, surname, birth_date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.document(),
                record.name(),
                record.surname(),
                record.birth_date_iso(),
            ],
        );

        match result {
            Ok(_) => {
                info!(
                    "event=patient_insert module=repo status=ok document={}",
                    mask_document(record.document())
                );
                Ok(())
            }
            Err(err) if is_duplicate_key(&err) => {
                warn!(
                    "event=patient_insert module=repo status=rejected reason=primary_key document={}",
                    mask_document(record.document())
                );
                Err(RepositoryError::DuplicateKey(record.document().to_string()))
            }
            Err(err) => {
                error!(
                    "event=patient_insert module=repo status=error error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Whether a row with exactly this document exists.
    ///
    /// Compares the stored string as-is; `X1234567L` and `01234567L` differ.
    pub fn exists_by_document(&self, document: &str) -> RepoResult<bool> {
        let exists: bool = self.db.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE document = ?1)",
            [document],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List all patients, ordered by document.
    pub fn find_all(&self) -> RepoResult<Vec<PatientRecord>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(&format!("{PATIENT_SELECT_SQL} ORDER BY document ASC"))?;
        let mut rows = stmt.query([])?;

        let mut patients = Vec::new();
        while let Some(row) = rows.next()? {
            patients.push(parse_patient_row(row)?);
        }

        debug!(
            "event=patient_find_all module=repo status=ok count={}",
            patients.len()
        );
        Ok(patients)
    }

    /// Get a patient by document, with its stored hospitalization count.
    pub fn find_by_document(&self, document: &str) -> RepoResult<Option<PatientRecord>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(&format!("{PATIENT_SELECT_SQL} WHERE document = ?1"))?;
        let mut rows = stmt.query([document])?;

        let record = match rows.next()? {
            Some(row) => parse_patient_row(row)?,
            None => return Ok(None),
        };

        let mut count = 1;
        while rows.next()?.is_some() {
            count += 1;
        }
        if count > 1 {
            error!(
                "event=patient_find module=repo status=error reason=inconsistent count={} document={}",
                count,
                mask_document(document)
            );
            return Err(RepositoryError::Inconsistent {
                document: document.to_string(),
                count,
            });
        }

        Ok(Some(record))
    }

    /// Delete every row with this document. Returns the number removed.
    pub fn delete_by_document(&self, document: &str) -> RepoResult<usize> {
        let rows_affected = self
            .db
            .conn()
            .execute("DELETE FROM patients WHERE document = ?1", [document])?;

        info!(
            "event=patient_delete module=repo status=ok rows={} document={}",
            rows_affected,
            mask_document(document)
        );
        Ok(rows_affected)
    }

    /// Add one hospitalization in a single update statement.
    ///
    /// Returns `false` when no patient has this document.
    pub fn increment_hospitalizations(&self, document: &str) -> RepoResult<bool> {
        let rows_affected = self.db.conn().execute(
            r#"
            UPDATE patients
            SET hospitalization_count = hospitalization_count + 1
            WHERE document = ?1
            "#,
            [document],
        )?;

        info!(
            "event=patient_increment module=repo status=ok rows={} document={}",
            rows_affected,
            mask_document(document)
        );
        Ok(rows_affected > 0)
    }

    /// Snapshot every stored patient for export.
    pub fn export_roster(&self) -> RepoResult<RosterExport> {
        Ok(RosterExport::from_records(&self.find_all()?))
    }
}

fn parse_patient_row(row: &Row<'_>) -> RepoResult<PatientRecord> {
    let birth_text: String = row.get("birth_date")?;
    let birth_date = parse_birth_date(&birth_text).map_err(|_| {
        RepositoryError::InvalidData(format!(
            "invalid date `{birth_text}` in patients.birth_date"
        ))
    })?;

    let count: i64 = row.get("hospitalization_count")?;
    let hospitalization_count = u32::try_from(count).map_err(|_| {
        RepositoryError::InvalidData(format!(
            "invalid count `{count}` in patients.hospitalization_count"
        ))
    })?;

    Ok(PatientRecord::from_storage(
        row.get("document")?,
        row.get("name")?,
        row.get("surname")?,
        birth_date,
        hospitalization_count,
    ))
}

fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
