//! Audit record models.

use serde::{Deserialize, Serialize};

/// Outcome recorded for a printed label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Printed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Printed => "printed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "printed" => Some(AuditStatus::Printed),
            _ => None,
        }
    }
}

/// Immutable proof that one label line was printed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    /// `{print_session_id}-{entry_index}`
    pub id: String,
    /// RFC 3339 timestamp shared by the whole batch
    pub timestamp: String,
    /// Token shared by every record of one print action
    pub print_session_id: String,
    pub patient_id: String,
    pub patient_year: String,
    pub patient_name: String,
    pub drug_name: String,
    pub instruction_text: String,
    /// Operator full name
    pub printed_by: String,
    /// `MM/YY` expiry token
    pub expiry_date: String,
    /// Labels printed per entry in this run
    pub print_quantity: u32,
    pub status: AuditStatus,
}

impl AuditRecord {
    /// Build the record id for entry `index` of a print session.
    pub fn record_id(print_session_id: &str, index: usize) -> String {
        format!("{}-{}", print_session_id, index)
    }
}
