//! Patient models.

use serde::{Deserialize, Serialize};

/// A patient record as held by the patient directory.
///
/// Patients are addressed by their registration id together with the
/// registration year; the pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Registration id within the year
    pub patient_id: String,
    /// Registration year (e.g., "2025")
    pub year: String,
    /// Display name, printed on every label
    pub name: String,
    /// National identity number
    pub national_id: Option<String>,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(patient_id: String, year: String, name: String) -> Self {
        Self {
            patient_id,
            year,
            name,
            national_id: None,
        }
    }

    /// Combined identifier shown in the label header.
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.patient_id, self.year)
    }

    /// Freeze the fields a print run needs.
    pub fn snapshot(&self) -> PatientSnapshot {
        PatientSnapshot {
            patient_id: self.patient_id.clone(),
            year: self.year.clone(),
            name: self.name.clone(),
            full_id: self.full_id(),
        }
    }
}

/// Copy of the patient fields taken at print time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSnapshot {
    pub patient_id: String,
    pub year: String,
    pub name: String,
    pub full_id: String,
}
