//! Print state machine states and outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AuditRecord;
use crate::render::RenderError;

/// Where a print action currently is.
///
/// Success path: `Idle → Validating → Rendering → Auditing → Resetting → Idle`.
/// A failed precondition goes `Validating → Blocked → Idle`; a failed render
/// goes `Rendering → Idle`. Both leave the session untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PrintState {
    #[default]
    Idle,
    Validating,
    Blocked,
    Rendering,
    Auditing,
    Resetting,
}

/// Reasons a print action did not produce labels.
#[derive(Error, Debug)]
pub enum PrintError {
    #[error("Please search and select a patient first")]
    NoPatientSelected,

    #[error("Basket is empty. Please add medications first")]
    EmptyBasket,

    #[error("Missing expiry dates for: {}", .0.join(", "))]
    IncompleteExpiry(Vec<String>),

    #[error("User not logged in")]
    NotAuthenticated,

    #[error("Label rendering failed: {0}")]
    RenderFailure(#[from] RenderError),
}

/// What happened to the audit trail of a successful print.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Recorded { records: Vec<AuditRecord> },
    /// Labels were produced but the ledger append failed
    Failed { message: String },
}

/// Result of a print action that produced labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintReceipt {
    pub print_session_id: String,
    pub entry_count: usize,
    pub label_count: usize,
    pub audit: AuditOutcome,
}

impl PrintReceipt {
    /// Warning to surface to the operator, if auditing failed.
    pub fn audit_warning(&self) -> Option<&str> {
        match &self.audit {
            AuditOutcome::Recorded { .. } => None,
            AuditOutcome::Failed { message } => Some(message),
        }
    }

    pub fn audited_records(&self) -> &[AuditRecord] {
        match &self.audit {
            AuditOutcome::Recorded { records } => records,
            AuditOutcome::Failed { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_expiry_message_lists_names() {
        let err = PrintError::IncompleteExpiry(vec!["X".into(), "Y".into()]);
        assert_eq!(err.to_string(), "Missing expiry dates for: X, Y");
    }

    #[test]
    fn test_receipt_warning() {
        let receipt = PrintReceipt {
            print_session_id: "S".into(),
            entry_count: 1,
            label_count: 2,
            audit: AuditOutcome::Failed {
                message: "disk full".into(),
            },
        };
        assert_eq!(receipt.audit_warning(), Some("disk full"));
        assert!(receipt.audited_records().is_empty());
    }
}
