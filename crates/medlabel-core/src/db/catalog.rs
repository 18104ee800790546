//! Medication catalog database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Medication;

impl Database {
    /// Insert or update a medication, keyed by drug name.
    pub fn upsert_medication(&self, medication: &Medication) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medications (drug_name, default_instruction, code, active, updated_at)
            VALUES (?1, ?2, ?3, 1, datetime('now'))
            ON CONFLICT(drug_name) DO UPDATE SET
                default_instruction = excluded.default_instruction,
                code = excluded.code,
                active = 1,
                updated_at = datetime('now')
            "#,
            params![
                medication.drug_name,
                medication.default_instruction,
                medication.code,
            ],
        )?;
        Ok(())
    }

    /// Get an active medication by exact drug name.
    pub fn get_medication(&self, drug_name: &str) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                r#"
                SELECT drug_name, default_instruction, code
                FROM medications
                WHERE drug_name = ? AND active = 1
                "#,
                [drug_name],
                |row| {
                    Ok(Medication {
                        drug_name: row.get(0)?,
                        default_instruction: row.get(1)?,
                        code: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List active medications in catalog order.
    pub fn list_medications(&self) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT drug_name, default_instruction, code
            FROM medications
            WHERE active = 1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Medication {
                drug_name: row.get(0)?,
                default_instruction: row.get(1)?,
                code: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Hide a medication from the catalog without deleting it.
    pub fn deactivate_medication(&self, drug_name: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE medications SET active = 0, updated_at = datetime('now') WHERE drug_name = ?",
            [drug_name],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let mut med = Medication::new("Amoxicillin 500mg".into(), "Three times daily".into());
        med.code = Some("6221025000123".into());
        db.upsert_medication(&med).unwrap();

        let found = db.get_medication("Amoxicillin 500mg").unwrap().unwrap();
        assert_eq!(found, med);
    }

    #[test]
    fn test_upsert_updates_instruction() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_medication(&Medication::new("A".into(), "old".into()))
            .unwrap();
        db.upsert_medication(&Medication::new("A".into(), "new".into()))
            .unwrap();

        let all = db.list_medications().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].default_instruction, "new");
    }

    #[test]
    fn test_list_in_catalog_order() {
        let db = Database::open_in_memory().unwrap();
        for name in ["Zinc", "Aspirin", "Metformin"] {
            db.upsert_medication(&Medication::new(name.into(), "x".into()))
                .unwrap();
        }
        let names: Vec<_> = db
            .list_medications()
            .unwrap()
            .into_iter()
            .map(|m| m.drug_name)
            .collect();
        assert_eq!(names, vec!["Zinc", "Aspirin", "Metformin"]);
    }

    #[test]
    fn test_deactivate_hides() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_medication(&Medication::new("A".into(), "x".into()))
            .unwrap();
        assert!(db.deactivate_medication("A").unwrap());
        assert!(db.get_medication("A").unwrap().is_none());
        assert!(db.list_medications().unwrap().is_empty());
    }
}
