//! Basket entry model.

use serde::{Deserialize, Serialize};

/// Instruction used when neither the catalog nor the operator supplies one.
pub const DEFAULT_INSTRUCTION: &str = "Take as directed";

/// A single medication waiting to be printed for the current patient.
///
/// The expiry date is never stored: it is derived from month and year on
/// every read, so the two can not drift apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketEntry {
    /// Opaque unique token, stable for the lifetime of the entry
    pub id: String,
    /// Drug name as printed on the label
    pub drug_name: String,
    /// Dosing instruction (catalog default or operator override)
    pub instruction_text: String,
    pub(crate) expiry_month: Option<String>,
    pub(crate) expiry_year: Option<String>,
}

impl BasketEntry {
    /// Create a new entry with a fresh id and no expiry.
    pub fn new(drug_name: String, instruction_text: String) -> Self {
        let instruction_text = if instruction_text.trim().is_empty() {
            DEFAULT_INSTRUCTION.to_string()
        } else {
            instruction_text
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            drug_name,
            instruction_text,
            expiry_month: None,
            expiry_year: None,
        }
    }

    /// Two-digit expiry month, if set.
    pub fn expiry_month(&self) -> Option<&str> {
        self.expiry_month.as_deref()
    }

    /// Two-digit expiry year, if set.
    pub fn expiry_year(&self) -> Option<&str> {
        self.expiry_year.as_deref()
    }

    /// Derived `MM/YY` token; `None` unless both month and year are set.
    pub fn expiry_date(&self) -> Option<String> {
        crate::expiry::expiry_token(self.expiry_month(), self.expiry_year())
    }

    /// Whether this entry may be printed.
    pub fn has_expiry(&self) -> bool {
        self.expiry_date().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry() {
        let entry = BasketEntry::new("Amoxicillin".into(), "Three times daily".into());
        assert_eq!(entry.drug_name, "Amoxicillin");
        assert_eq!(entry.instruction_text, "Three times daily");
        assert_eq!(entry.id.len(), 36); // UUID format
        assert!(entry.expiry_date().is_none());
        assert!(!entry.has_expiry());
    }

    #[test]
    fn test_blank_instruction_uses_default() {
        let entry = BasketEntry::new("Paracetamol".into(), "   ".into());
        assert_eq!(entry.instruction_text, DEFAULT_INSTRUCTION);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = BasketEntry::new("A".into(), "x".into());
        let b = BasketEntry::new("A".into(), "x".into());
        assert_ne!(a.id, b.id);
    }
}
