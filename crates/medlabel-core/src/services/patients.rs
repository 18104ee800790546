//! Patient lookup.

use tracing::debug;

use crate::db::{Database, DbResult};
use crate::models::Patient;

/// Result of a patient search.
#[derive(Debug, Clone, PartialEq)]
pub enum PatientLookup {
    Found(Patient),
    NotFound { message: String },
}

/// Resolve a patient from registration id and year.
pub trait PatientDirectory {
    fn search(&self, patient_id: &str, year: &str) -> DbResult<PatientLookup>;
}

impl PatientDirectory for Database {
    fn search(&self, patient_id: &str, year: &str) -> DbResult<PatientLookup> {
        let (patient_id, year) = (patient_id.trim(), year.trim());
        if patient_id.is_empty() || year.is_empty() {
            return Ok(PatientLookup::NotFound {
                message: "Patient ID and year are both required".into(),
            });
        }

        debug!(patient_id, year, "Searching patient");
        Ok(match self.get_patient(patient_id, year)? {
            Some(patient) => PatientLookup::Found(patient),
            None => PatientLookup::NotFound {
                message: format!("No patient {} registered in {}", patient_id, year),
            },
        })
    }
}
