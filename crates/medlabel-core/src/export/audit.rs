//! Audit log export (JSON and CSV).

use serde::{Deserialize, Serialize};

use crate::audit::{AuditLedger, AuditResult};
use crate::models::AuditRecord;

/// Snapshot of the audit log at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Export timestamp
    pub exported_at: String,
    /// Number of distinct print actions
    pub print_sessions: usize,
    /// Total physical labels across all records
    pub total_labels: u64,
    /// Records in append order
    pub records: Vec<AuditRecord>,
}

impl AuditExport {
    /// Build an export from records.
    pub fn from_records(records: Vec<AuditRecord>) -> Self {
        let mut sessions: Vec<&str> = records.iter().map(|r| r.print_session_id.as_str()).collect();
        sessions.sort_unstable();
        sessions.dedup();
        let print_sessions = sessions.len();

        let total_labels = records.iter().map(|r| u64::from(r.print_quantity)).sum();

        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            print_sessions,
            total_labels,
            records,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("id,timestamp,print_session_id,patient_id,patient_year,patient_name,drug_name,instruction_text,printed_by,expiry_date,print_quantity,status\n");

        for r in &self.records {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&r.id),
                escape_csv(&r.timestamp),
                escape_csv(&r.print_session_id),
                escape_csv(&r.patient_id),
                escape_csv(&r.patient_year),
                escape_csv(&r.patient_name),
                escape_csv(&r.drug_name),
                escape_csv(&r.instruction_text),
                escape_csv(&r.printed_by),
                escape_csv(&r.expiry_date),
                r.print_quantity,
                r.status.as_str(),
            ));
        }

        csv
    }
}

/// Audit exporter.
pub struct AuditExporter<'a> {
    ledger: &'a AuditLedger<'a>,
}

impl<'a> AuditExporter<'a> {
    pub fn new(ledger: &'a AuditLedger<'a>) -> Self {
        Self { ledger }
    }

    /// Export the whole log. Corruption is reported, not hidden.
    pub fn export_all(&self) -> AuditResult<AuditExport> {
        Ok(AuditExport::from_records(self.ledger.try_load_all()?))
    }
}

/// Escape a value for CSV.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
