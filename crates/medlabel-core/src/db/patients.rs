//! Patient database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Patient;

impl Database {
    /// Insert or update a patient, keyed by id and year.
    pub fn upsert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (patient_id, year, name, national_id, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(patient_id, year) DO UPDATE SET
                name = excluded.name,
                national_id = excluded.national_id,
                updated_at = datetime('now')
            "#,
            params![
                patient.patient_id,
                patient.year,
                patient.name,
                patient.national_id,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by registration id and year.
    pub fn get_patient(&self, patient_id: &str, year: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, year, name, national_id
                FROM patients
                WHERE patient_id = ?1 AND year = ?2
                "#,
                params![patient_id, year],
                |row| {
                    Ok(Patient {
                        patient_id: row.get(0)?,
                        year: row.get(1)?,
                        name: row.get(2)?,
                        national_id: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

}
