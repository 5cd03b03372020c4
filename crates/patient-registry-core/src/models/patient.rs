//! Patient models.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::identity::{parse_document, ValidatedDocument};

/// Textual form of every date crossing the crate boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input validation errors. Always recoverable by asking the caller again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid identity document: {0}")]
    InvalidDocument(String),

    #[error("Invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),
}

/// A registered patient.
///
/// The identity document is the primary key and cannot change once the
/// record exists. `hospitalization_count` starts at zero and is only ever
/// advanced by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    document: String,
    name: String,
    surname: String,
    birth_date: NaiveDate,
    hospitalization_count: u32,
}

impl PatientRecord {
    /// Build a validated record from raw caller input.
    ///
    /// Surrounding whitespace is trimmed from every field. The document is
    /// checked case-sensitively, so `12345678z` is rejected.
    pub fn new(
        document: &str,
        name: &str,
        surname: &str,
        birth_date: &str,
    ) -> Result<Self, ValidationError> {
        let document = document.trim();
        if parse_document(document).is_none() {
            return Err(ValidationError::InvalidDocument(document.to_string()));
        }

        Ok(Self {
            document: document.to_string(),
            name: required("name", name)?,
            surname: required("surname", surname)?,
            birth_date: parse_birth_date(birth_date)?,
            hospitalization_count: 0,
        })
    }

    /// Rebuild a record read back from storage.
    ///
    /// Stored rows are trusted: no checksum or blank-field checks run here.
    pub fn from_storage(
        document: String,
        name: String,
        surname: String,
        birth_date: NaiveDate,
        hospitalization_count: u32,
    ) -> Self {
        Self {
            document,
            name,
            surname,
            birth_date,
            hospitalization_count,
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn hospitalization_count(&self) -> u32 {
        self.hospitalization_count
    }

    /// Birth date in `YYYY-MM-DD` form, as persisted.
    pub fn birth_date_iso(&self) -> String {
        self.birth_date.format(DATE_FORMAT).to_string()
    }

    /// Canonical checksum view of the document, if it is valid.
    pub fn validated_document(&self) -> Option<ValidatedDocument> {
        parse_document(&self.document)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = required("name", name)?;
        Ok(())
    }

    pub fn set_surname(&mut self, surname: &str) -> Result<(), ValidationError> {
        self.surname = required("surname", surname)?;
        Ok(())
    }

    pub fn set_birth_date(&mut self, birth_date: NaiveDate) {
        self.birth_date = birth_date;
    }

    /// Multi-line detail view: listing line, birth date, hospitalizations.
    pub fn details(&self) -> String {
        format!(
            "{}\nBirth date: {}\nHospitalizations: {}",
            self,
            self.birth_date_iso(),
            self.hospitalization_count
        )
    }
}

impl fmt::Display for PatientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.document, self.name, self.surname)
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Shorthand such as `2019-4-2` is rejected even though chrono would accept
/// it, so the parsed value always formats back to the input.
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == trimmed)
        .ok_or_else(|| ValidationError::InvalidDate(trimmed.to_string()))
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = PatientRecord::new("12345678Z", "Ana", "García López", "1990-04-22").unwrap();
        assert_eq!(patient.document(), "12345678Z");
        assert_eq!(patient.name(), "Ana");
        assert_eq!(patient.surname(), "García López");
        assert_eq!(patient.birth_date_iso(), "1990-04-22");
        assert_eq!(patient.hospitalization_count(), 0);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let patient = PatientRecord::new(" X1234567L ", "  Ana ", " Ruiz", "2001-01-31 ").unwrap();
        assert_eq!(patient.document(), "X1234567L");
        assert_eq!(patient.name(), "Ana");
        assert_eq!(patient.surname(), "Ruiz");
    }

    #[test]
    fn test_foreign_document_keeps_raw_form() {
        let patient = PatientRecord::new("X1234567L", "Ana", "Ruiz", "2001-01-31").unwrap();
        assert_eq!(patient.document(), "X1234567L");
        assert_eq!(
            patient.validated_document().unwrap().canonical(),
            "01234567L"
        );
    }

    #[test]
    fn test_rejects_invalid_document() {
        let err = PatientRecord::new("12345678A", "Ana", "Ruiz", "2001-01-31").unwrap_err();
        assert_eq!(err, ValidationError::InvalidDocument("12345678A".into()));

        let err = PatientRecord::new("12345678z", "Ana", "Ruiz", "2001-01-31").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDocument(_)));
    }

    #[test]
    fn test_rejects_empty_fields() {
        let err = PatientRecord::new("12345678Z", "   ", "Ruiz", "2001-01-31").unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("name"));

        let err = PatientRecord::new("12345678Z", "Ana", "", "2001-01-31").unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("surname"));
    }

    #[test]
    fn test_rejects_bad_dates() {
        for raw in ["", "2019-02-30", "2019-13-01", "2019-4-22", "22/04/2019", "2019-04-22T00:00"] {
            let err = PatientRecord::new("12345678Z", "Ana", "Ruiz", raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidDate(_)),
                "{raw:?} should be an invalid date"
            );
        }
    }

    #[test]
    fn test_leap_day_accepted() {
        let date = parse_birth_date("2000-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
    }

    #[test]
    fn test_from_storage_keeps_count() {
        let date = NaiveDate::from_ymd_opt(1985, 7, 3).unwrap();
        let patient =
            PatientRecord::from_storage("12345678Z".into(), "Ana".into(), "Ruiz".into(), date, 4);
        assert_eq!(patient.hospitalization_count(), 4);
        assert_eq!(patient.birth_date(), date);
    }

    #[test]
    fn test_setters_do_not_touch_identity() {
        let mut patient = PatientRecord::new("12345678Z", "Ana", "Ruiz", "2001-01-31").unwrap();
        patient.set_name("Lucía").unwrap();
        patient.set_surname("Martín").unwrap();
        patient.set_birth_date(NaiveDate::from_ymd_opt(2002, 2, 2).unwrap());

        assert_eq!(patient.document(), "12345678Z");
        assert_eq!(patient.name(), "Lucía");
        assert_eq!(patient.surname(), "Martín");
        assert_eq!(patient.birth_date_iso(), "2002-02-02");

        assert_eq!(patient.set_name(" "), Err(ValidationError::EmptyField("name")));
        assert_eq!(patient.name(), "Lucía");
    }

    #[test]
    fn test_display_and_details() {
        let patient = PatientRecord::new("12345678Z", "Ana", "Ruiz", "2001-01-31").unwrap();
        assert_eq!(patient.to_string(), "[12345678Z] Ana Ruiz");
        assert_eq!(
            patient.details(),
            "[12345678Z] Ana Ruiz\nBirth date: 2001-01-31\nHospitalizations: 0"
        );
    }

    #[test]
    fn test_serializes_iso_date() {
        let patient = PatientRecord::new("12345678Z", "Ana", "Ruiz", "2001-01-31").unwrap();
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["birth_date"], "2001-01-31");
        assert_eq!(json["hospitalization_count"], 0);
    }
}
