//! Audit ledger backed by the `audit_records` table.

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{AuditRecord, AuditStatus, BasketEntry, PatientSnapshot};
use crate::session::PrintQuantity;

/// Audit ledger errors.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit append failed: {0}")]
    AppendFailure(#[source] DbError),

    #[error("Audit storage corrupt: {0}")]
    StorageCorrupt(#[source] DbError),

    #[error("Audit storage error: {0}")]
    Storage(#[from] DbError),
}

pub type AuditResult<T> = Result<T, AuditError>;

/// Everything about a print action that is not per-entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintContext {
    /// Token shared by every record of this print action
    pub print_session_id: String,
    /// RFC 3339 timestamp shared by every record
    pub timestamp: String,
    pub patient: PatientSnapshot,
    /// Operator full name
    pub printed_by: String,
    pub print_quantity: PrintQuantity,
}

impl PrintContext {
    /// Context stamped with the current time and a fresh session token.
    pub fn new(
        patient: PatientSnapshot,
        printed_by: String,
        print_quantity: PrintQuantity,
    ) -> Self {
        let now = chrono::Utc::now();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        Self {
            print_session_id: format!("{}-{}", now.timestamp_millis(), &nonce[..8]),
            timestamp: now.to_rfc3339(),
            patient,
            printed_by,
            print_quantity,
        }
    }

    /// One record per entry, in basket order.
    pub fn records_for(&self, entries: &[BasketEntry]) -> Vec<AuditRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| AuditRecord {
                id: AuditRecord::record_id(&self.print_session_id, index),
                timestamp: self.timestamp.clone(),
                print_session_id: self.print_session_id.clone(),
                patient_id: self.patient.patient_id.clone(),
                patient_year: self.patient.year.clone(),
                patient_name: self.patient.name.clone(),
                drug_name: entry.drug_name.clone(),
                instruction_text: entry.instruction_text.clone(),
                printed_by: self.printed_by.clone(),
                expiry_date: entry.expiry_date().unwrap_or_default(),
                print_quantity: self.print_quantity.get(),
                status: AuditStatus::Printed,
            })
            .collect()
    }
}

/// Durable log of print events.
pub trait AuditLog {
    /// Append one record per entry as a single all-or-nothing batch.
    fn append_batch(
        &self,
        entries: &[BasketEntry],
        context: &PrintContext,
    ) -> AuditResult<Vec<AuditRecord>>;

    /// Every record in append order. A store that can not be read yields
    /// an empty list.
    fn load_all(&self) -> Vec<AuditRecord>;

    /// Erase the whole log. Returns the number of records removed.
    fn clear_all(&self) -> AuditResult<usize>;
}

/// SQLite-backed audit ledger.
pub struct AuditLedger<'a> {
    db: &'a Database,
}

impl<'a> AuditLedger<'a> {
    /// Create a new ledger over the given database.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Strict load: reports corruption instead of hiding it.
    pub fn try_load_all(&self) -> AuditResult<Vec<AuditRecord>> {
        self.db
            .list_audit_records()
            .map_err(AuditError::StorageCorrupt)
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<AuditRecord> {
        let mut all = self.load_all();
        let skip = all.len().saturating_sub(n);
        all.split_off(skip)
    }

    /// Records of one print action.
    pub fn records_for_session(&self, print_session_id: &str) -> AuditResult<Vec<AuditRecord>> {
        Ok(self.db.list_audit_records_for_session(print_session_id)?)
    }

    pub fn count(&self) -> AuditResult<u32> {
        Ok(self.db.count_audit_records()?)
    }
}

impl AuditLog for AuditLedger<'_> {
    fn append_batch(
        &self,
        entries: &[BasketEntry],
        context: &PrintContext,
    ) -> AuditResult<Vec<AuditRecord>> {
        let records = context.records_for(entries);
        if records.is_empty() {
            return Ok(records);
        }

        self.db
            .insert_audit_batch(&records)
            .map_err(AuditError::AppendFailure)?;

        info!(
            print_session_id = %context.print_session_id,
            records = records.len(),
            "Audit batch appended"
        );
        Ok(records)
    }

    fn load_all(&self) -> Vec<AuditRecord> {
        match self.try_load_all() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Audit log unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    fn clear_all(&self) -> AuditResult<usize> {
        let removed = self.db.delete_all_audit_records()?;
        info!(removed, "Audit log cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry;
    use crate::models::Patient;

    fn context(quantity: u32) -> PrintContext {
        let patient = Patient::new("1042".into(), "2025".into(), "Sara Ahmed".into());
        PrintContext::new(
            patient.snapshot(),
            "Dr Mahmoud".into(),
            PrintQuantity::new(quantity, 10).unwrap(),
        )
    }

    fn entry(name: &str) -> BasketEntry {
        let mut e = BasketEntry::new(name.into(), "Take as directed".into());
        expiry::set_month(&mut e, "01");
        expiry::set_year(&mut e, "26");
        e
    }

    #[test]
    fn test_append_batch_shares_session() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        let ctx = context(3);

        let records = ledger
            .append_batch(&[entry("A"), entry("B"), entry("C")], &ctx)
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.print_session_id == ctx.print_session_id));
        assert!(records.iter().all(|r| r.timestamp == ctx.timestamp));
        assert!(records.iter().all(|r| r.print_quantity == 3));
        assert_eq!(records[2].id, format!("{}-2", ctx.print_session_id));
        assert_eq!(records[0].expiry_date, "01/26");
        assert_eq!(records[0].printed_by, "Dr Mahmoud");

        assert_eq!(ledger.load_all(), records);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        assert!(ledger.append_batch(&[], &context(1)).unwrap().is_empty());
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn test_failed_batch_leaves_log_unchanged() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        let ctx = context(1);

        // Occupy the id of the second record so the batch fails midway
        let blocker = ctx.records_for(&[entry("X"), entry("Y")]).remove(1);
        db.insert_audit_batch(std::slice::from_ref(&blocker)).unwrap();
        let before = ledger.load_all();

        let result = ledger.append_batch(&[entry("A"), entry("B")], &ctx);
        assert!(matches!(result, Err(AuditError::AppendFailure(_))));
        assert_eq!(ledger.load_all(), before);
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        ledger.append_batch(&[entry("A")], &context(1)).unwrap();
        db.conn()
            .execute_batch(
                r#"
                INSERT INTO audit_records (
                    id, timestamp, print_session_id, patient_id, patient_year, patient_name,
                    drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
                ) VALUES ('bad-0', 't', 'bad', '1', '2025', 'P', 'D', 'I', 'Op', '01/26', 1, '???');
                "#,
            )
            .unwrap();

        assert!(ledger.load_all().is_empty());
        assert!(matches!(
            ledger.try_load_all(),
            Err(AuditError::StorageCorrupt(_))
        ));
    }

    #[test]
    fn test_clear_all_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        assert_eq!(ledger.clear_all().unwrap(), 0);

        ledger.append_batch(&[entry("A")], &context(1)).unwrap();
        assert_eq!(ledger.clear_all().unwrap(), 1);
        assert_eq!(ledger.clear_all().unwrap(), 0);
        assert!(ledger.load_all().is_empty());
    }

    #[test]
    fn test_recent() {
        let db = Database::open_in_memory().unwrap();
        let ledger = AuditLedger::new(&db);
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let entries: Vec<_> = names.iter().map(|n| entry(n)).collect();
        ledger.append_batch(&entries, &context(1)).unwrap();

        let recent: Vec<_> = ledger.recent(5).into_iter().map(|r| r.drug_name).collect();
        assert_eq!(recent, vec!["C", "D", "E", "F", "G"]);
        assert_eq!(ledger.recent(50).len(), 7);
    }

    #[test]
    fn test_session_tokens_differ() {
        let a = context(1);
        let b = context(1);
        assert_ne!(a.print_session_id, b.print_session_id);
    }
}
