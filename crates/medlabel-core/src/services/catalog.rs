//! Medication catalog lookup.

use crate::db::{Database, DbResult};
use crate::models::{filter_medications, Medication};

/// Source of medications the operator can choose from.
pub trait MedicationCatalog {
    fn list_medications(&self) -> DbResult<Vec<Medication>>;

    /// Medications whose name or instruction contains `term`.
    fn search_medications(&self, term: &str) -> DbResult<Vec<Medication>> {
        Ok(filter_medications(&self.list_medications()?, term))
    }
}

impl MedicationCatalog for Database {
    fn list_medications(&self) -> DbResult<Vec<Medication>> {
        Database::list_medications(self)
    }
}
