//! Operator session: who is logged in, which patient is selected and what
//! is in the basket.
//!
//! A session is an explicit value owned by the caller (one per terminal).
//! Nothing here is process-global.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::basket::BasketStore;
use crate::models::{BasketEntry, Medication, Operator, Patient};

/// Upper bound on labels per entry unless configured otherwise.
pub const DEFAULT_MAX_PRINT_QUANTITY: u32 = 10;

/// Hard ceiling on labels per entry, whatever the configured maximum.
pub const PRINT_QUANTITY_CEILING: u32 = 100;

/// Session-level errors for basket mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("No patient selected")]
    NoPatientSelected,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid print quantity: {0}")]
    InvalidQuantity(u32),
}

/// Labels printed per basket entry. Always in `1..=PRINT_QUANTITY_CEILING`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub struct PrintQuantity(u32);

impl PrintQuantity {
    /// Accept `n` if it lies in `1..=max` (and under the ceiling).
    pub fn new(n: u32, max: u32) -> Option<Self> {
        if n >= 1 && n <= Self::effective_max(max) {
            Some(Self(n))
        } else {
            None
        }
    }

    /// Parse operator input. Unparseable or zero input falls back to 1,
    /// values above `max` are clamped.
    pub fn from_input(input: &str, max: u32) -> Self {
        match input.trim().parse::<u32>() {
            Ok(0) | Err(_) => Self(1),
            Ok(n) => Self(n.min(Self::effective_max(max))),
        }
    }

    fn effective_max(max: u32) -> u32 {
        max.clamp(1, PRINT_QUANTITY_CEILING)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for PrintQuantity {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for PrintQuantity {
    type Error = SessionError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n, PRINT_QUANTITY_CEILING).ok_or(SessionError::InvalidQuantity(n))
    }
}

impl From<PrintQuantity> for u32 {
    fn from(q: PrintQuantity) -> Self {
        q.0
    }
}

/// Overview shown before printing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintSummary {
    pub patient_name: Option<String>,
    pub medication_count: u32,
    pub total_labels: u32,
    pub expiry_set: u32,
    /// Every entry has an expiry and the basket is not empty
    pub ready: bool,
}

/// State of one operator terminal between login and logout.
#[derive(Debug, Clone, Default)]
pub struct Session {
    operator: Option<Operator>,
    patient: Option<Patient>,
    basket: BasketStore,
    print_quantity: PrintQuantity,
}

impl Session {
    /// Start a session for an authenticated operator.
    pub fn login(operator: Operator) -> Self {
        info!(operator = %operator.username, "Session started");
        Self {
            operator: Some(operator),
            ..Self::default()
        }
    }

    /// Drop everything: operator, patient, basket and quantity.
    pub fn logout(&mut self) {
        if let Some(op) = &self.operator {
            info!(operator = %op.username, "Session ended");
        }
        *self = Self::default();
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.operator.is_some()
    }

    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    /// Replace the selected patient. `None` deselects (failed search).
    pub fn set_patient(&mut self, patient: Option<Patient>) {
        self.patient = patient;
    }

    pub fn basket(&self) -> &BasketStore {
        &self.basket
    }

    pub fn basket_mut(&mut self) -> &mut BasketStore {
        &mut self.basket
    }

    pub fn print_quantity(&self) -> PrintQuantity {
        self.print_quantity
    }

    pub fn set_print_quantity(&mut self, quantity: PrintQuantity) {
        self.print_quantity = quantity;
    }

    /// Add a catalog medication to the basket.
    ///
    /// A non-blank `custom_instruction` replaces the catalog instruction.
    pub fn add_medication(
        &mut self,
        medication: &Medication,
        custom_instruction: Option<&str>,
    ) -> Result<&BasketEntry, SessionError> {
        if self.operator.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        if self.patient.is_none() {
            return Err(SessionError::NoPatientSelected);
        }

        let instruction = match custom_instruction.map(str::trim) {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => medication.default_instruction.clone(),
        };

        Ok(self.basket.add(medication.drug_name.clone(), instruction))
    }

    pub fn summary(&self) -> PrintSummary {
        let count = self.basket.len() as u32;
        let expiry_set = self.basket.expiry_set_count() as u32;
        PrintSummary {
            patient_name: self.patient.as_ref().map(|p| p.name.clone()),
            medication_count: count,
            total_labels: count.saturating_mul(self.print_quantity.get()),
            expiry_set,
            ready: count > 0 && expiry_set == count,
        }
    }
}
