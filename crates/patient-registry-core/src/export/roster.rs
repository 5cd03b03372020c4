//! Patient roster export.

use serde::Serialize;

use crate::models::PatientRecord;

const CSV_HEADER: &str = "document,name,surname,birth_date,hospitalization_count\n";

/// Snapshot of the registry for hand-off to other systems.
#[derive(Debug, Clone, Serialize)]
pub struct RosterExport {
    /// Export timestamp
    pub exported_at: String,
    /// Number of patients in the snapshot
    pub total_patients: usize,
    /// Patients, in the order they were supplied
    pub patients: Vec<PatientRecord>,
}

impl RosterExport {
    /// Build an export from a set of records.
    pub fn from_records(records: &[PatientRecord]) -> Self {
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            total_patients: records.len(),
            patients: records.to_vec(),
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);

        for patient in &self.patients {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(patient.document()),
                escape_csv(patient.name()),
                escape_csv(patient.surname()),
                patient.birth_date_iso(),
                patient.hospitalization_count(),
            ));
        }

        csv
    }

    /// One `[document] name surname` line per patient.
    pub fn to_listing(&self) -> String {
        self.patients
            .iter()
            .map(|p| format!("{p}\n"))
            .collect()
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
