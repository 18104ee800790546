//! In-memory basket of medications awaiting print.

use tracing::debug;

use crate::expiry;
use crate::models::BasketEntry;

/// Ordered collection of basket entries for one session.
///
/// Insertion order is label order. The store has no internal locking;
/// callers serialize access.
#[derive(Debug, Clone, Default)]
pub struct BasketStore {
    entries: Vec<BasketEntry>,
}

impl BasketStore {
    /// Create an empty basket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry and return it.
    pub fn add(&mut self, drug_name: String, instruction_text: String) -> &BasketEntry {
        let entry = BasketEntry::new(drug_name, instruction_text);
        debug!(entry_id = %entry.id, drug = %entry.drug_name, "Basket entry added");
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove the entry with `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(entry_id = %id, "Basket entry removed");
        }
        removed
    }

    /// Empty the basket.
    pub fn clear(&mut self) {
        debug!(count = self.entries.len(), "Basket cleared");
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[BasketEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&BasketEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Set the expiry month of an entry. Returns `false` if the id is unknown.
    pub fn set_expiry_month(&mut self, id: &str, month: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                expiry::set_month(entry, month);
                true
            }
            None => false,
        }
    }

    /// Set the expiry year of an entry. Returns `false` if the id is unknown.
    pub fn set_expiry_year(&mut self, id: &str, year: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                expiry::set_year(entry, year);
                true
            }
            None => false,
        }
    }

    /// Drug names of entries that still lack an expiry, in basket order.
    pub fn missing_expiry(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.has_expiry())
            .map(|e| e.drug_name.clone())
            .collect()
    }

    /// Number of entries with an expiry set.
    pub fn expiry_set_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_expiry()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
