//! Medication catalog models.

use serde::{Deserialize, Serialize};

/// A medication the operator can add to the basket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Drug name as printed on the label
    pub drug_name: String,
    /// Instruction used unless the operator overrides it
    pub default_instruction: String,
    /// International barcode, when known
    pub code: Option<String>,
}

impl Medication {
    /// Create a new medication without a barcode.
    pub fn new(drug_name: String, default_instruction: String) -> Self {
        Self {
            drug_name,
            default_instruction,
            code: None,
        }
    }

    /// Case-insensitive substring match on name or instruction.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.drug_name.to_lowercase().contains(needle_lower)
            || self.default_instruction.to_lowercase().contains(needle_lower)
    }
}

/// Filter medications by a free-text search term.
///
/// A blank term returns every item.
pub fn filter_medications(items: &[Medication], term: &str) -> Vec<Medication> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|m| m.matches(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Medication> {
        vec![
            Medication::new("Amoxicillin 500mg".into(), "One capsule three times daily".into()),
            Medication::new("Paracetamol 500mg".into(), "Two tablets when needed".into()),
            Medication::new("Omeprazole 20mg".into(), "One capsule before breakfast".into()),
        ]
    }

    #[test]
    fn test_blank_term_returns_all() {
        assert_eq!(filter_medications(&catalog(), "   ").len(), 3);
    }

    #[test]
    fn test_matches_name_case_insensitive() {
        let found = filter_medications(&catalog(), "AMOX");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].drug_name, "Amoxicillin 500mg");
    }

    #[test]
    fn test_matches_instruction() {
        let found = filter_medications(&catalog(), "capsule");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_medications(&catalog(), "insulin").is_empty());
    }
}
