//! Audit log database operations.

use rusqlite::params;

use super::{Database, DbError, DbResult};
use crate::models::{AuditRecord, AuditStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT id, timestamp, print_session_id, patient_id, patient_year, patient_name,
           drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
    FROM audit_records
"#;

impl Database {
    /// Insert a batch of audit records in a single transaction.
    ///
    /// Either every record is stored or, on any failure, none is.
    pub fn insert_audit_batch(&self, records: &[AuditRecord]) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO audit_records (
                    id, timestamp, print_session_id, patient_id, patient_year, patient_name,
                    drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.timestamp,
                    record.print_session_id,
                    record.patient_id,
                    record.patient_year,
                    record.patient_name,
                    record.drug_name,
                    record.instruction_text,
                    record.printed_by,
                    record.expiry_date,
                    record.print_quantity,
                    record.status.as_str(),
                ])?;
            }
        }
        // Dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(())
    }

    /// List all audit records in append order.
    pub fn list_audit_records(&self) -> DbResult<Vec<AuditRecord>> {
        let sql = format!("{} ORDER BY seq", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// List the records of one print session in entry order.
    pub fn list_audit_records_for_session(
        &self,
        print_session_id: &str,
    ) -> DbResult<Vec<AuditRecord>> {
        let sql = format!("{} WHERE print_session_id = ? ORDER BY seq", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([print_session_id], read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// Count stored audit records.
    pub fn count_audit_records(&self) -> DbResult<u32> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM audit_records", [], |row| row.get(0))?;
        Ok(count as u32)
    }

    /// Delete every audit record. Returns the number removed.
    pub fn delete_all_audit_records(&self) -> DbResult<usize> {
        let rows_affected = self.conn.execute("DELETE FROM audit_records", [])?;
        Ok(rows_affected)
    }
}

/// Intermediate row struct for database mapping.
struct AuditRow {
    id: String,
    timestamp: String,
    print_session_id: String,
    patient_id: String,
    patient_year: String,
    patient_name: String,
    drug_name: String,
    instruction_text: String,
    printed_by: String,
    expiry_date: String,
    print_quantity: u32,
    status: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRow> {
    Ok(AuditRow {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        print_session_id: row.get(2)?,
        patient_id: row.get(3)?,
        patient_year: row.get(4)?,
        patient_name: row.get(5)?,
        drug_name: row.get(6)?,
        instruction_text: row.get(7)?,
        printed_by: row.get(8)?,
        expiry_date: row.get(9)?,
        print_quantity: row.get(10)?,
        status: row.get(11)?,
    })
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let status = AuditStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown audit status: {}", row.status)))?;

        Ok(AuditRecord {
            id: row.id,
            timestamp: row.timestamp,
            print_session_id: row.print_session_id,
            patient_id: row.patient_id,
            patient_year: row.patient_year,
            patient_name: row.patient_name,
            drug_name: row.drug_name,
            instruction_text: row.instruction_text,
            printed_by: row.printed_by,
            expiry_date: row.expiry_date,
            print_quantity: row.print_quantity,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(session: &str, index: usize, drug: &str) -> AuditRecord {
        AuditRecord {
            id: AuditRecord::record_id(session, index),
            timestamp: "2026-01-15T10:00:00Z".into(),
            print_session_id: session.into(),
            patient_id: "1042".into(),
            patient_year: "2025".into(),
            patient_name: "Sara Ahmed".into(),
            drug_name: drug.into(),
            instruction_text: "Take as directed".into(),
            printed_by: "Dr Mahmoud".into(),
            expiry_date: "01/26".into(),
            print_quantity: 2,
            status: AuditStatus::Printed,
        }
    }

    #[test]
    fn test_insert_and_list() {
        let db = Database::open_in_memory().unwrap();
        db.insert_audit_batch(&[make_record("S1", 0, "A"), make_record("S1", 1, "B")])
            .unwrap();

        let records = db.list_audit_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "S1-0");
        assert_eq!(records[1].drug_name, "B");
        assert_eq!(records[1].status, AuditStatus::Printed);
        assert_eq!(records[1].print_quantity, 2);
    }

    #[test]
    fn test_batch_rolls_back_on_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.insert_audit_batch(&[make_record("S1", 1, "Existing")])
            .unwrap();

        // S1-0 would insert, S1-1 collides: nothing from the batch may remain
        let result = db.insert_audit_batch(&[make_record("S1", 0, "A"), make_record("S1", 1, "B")]);
        assert!(result.is_err());

        let records = db.list_audit_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].drug_name, "Existing");
    }

    #[test]
    fn test_list_for_session() {
        let db = Database::open_in_memory().unwrap();
        db.insert_audit_batch(&[make_record("S1", 0, "A")]).unwrap();
        db.insert_audit_batch(&[make_record("S2", 0, "B"), make_record("S2", 1, "C")])
            .unwrap();

        let records = db.list_audit_records_for_session("S2").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(db.count_audit_records().unwrap(), 3);
    }

    #[test]
    fn test_unknown_status_is_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                r#"
                INSERT INTO audit_records (
                    id, timestamp, print_session_id, patient_id, patient_year, patient_name,
                    drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
                ) VALUES ('X-0', 't', 'X', '1', '2025', 'P', 'D', 'I', 'Op', '01/26', 1, 'garbled')
                "#,
                [],
            )
            .unwrap();

        assert!(matches!(
            db.list_audit_records(),
            Err(DbError::Constraint(_))
        ));
    }

    #[test]
    fn test_delete_all() {
        let db = Database::open_in_memory().unwrap();
        db.insert_audit_batch(&[make_record("S1", 0, "A")]).unwrap();
        assert_eq!(db.delete_all_audit_records().unwrap(), 1);
        assert_eq!(db.delete_all_audit_records().unwrap(), 0);
        assert!(db.list_audit_records().unwrap().is_empty());
    }
}
