//! Medlabel Core Library
//!
//! Pharmacy label station: pick a patient, fill a basket of medications
//! with instructions and expiry dates, print labels, keep an audit trail.
//!
//! # Architecture
//!
//! ```text
//! Login → Patient search → Catalog pick → Basket (+ expiry per entry)
//!                                               │
//!                                   ┌───────────▼───────────┐
//!                                   │   PrintOrchestrator   │
//!                                   │  validate preconditions│
//!                                   └───────────┬───────────┘
//!                                               │
//!                        ┌──────────────────────┼──────────────────────┐
//!                        ▼                      ▼                      ▼
//!                  LabelRenderer           AuditLedger           Basket clear
//!                 (HTML sheet, once)   (one batch, atomic)    (even if audit fails)
//! ```
//!
//! # Modules
//!
//! - [`expiry`]: month/year expiry token derivation
//! - [`basket`]: ordered in-memory basket
//! - [`session`]: per-terminal operator session
//! - [`audit`]: append-only audit ledger
//! - [`print`]: print state machine
//! - [`render`]: label rendering trait and HTML sheets
//! - [`services`]: login, patient lookup, medication catalog
//! - [`db`]: SQLite storage
//! - [`export`]: audit log export

pub mod audit;
pub mod basket;
pub mod config;
pub mod db;
pub mod expiry;
pub mod export;
pub mod logging;
pub mod models;
pub mod print;
pub mod render;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use audit::{AuditError, AuditLedger, AuditLog, PrintContext};
pub use basket::BasketStore;
pub use config::StationConfig;
pub use db::Database;
pub use models::{AuditRecord, AuditStatus, BasketEntry, Medication, Operator, Patient};
pub use print::{AuditOutcome, PrintError, PrintOrchestrator, PrintReceipt, PrintState};
pub use render::{HtmlFileRenderer, HtmlLabelSheet, LabelJob, LabelRenderer};
pub use services::{
    Authenticator, LoginOutcome, MedicationCatalog, PatientDirectory, PatientLookup,
};
pub use session::{PrintQuantity, Session};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LabelStationError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No patient selected: {0}")]
    NoPatientSelected(String),

    #[error("Basket is empty: {0}")]
    EmptyBasket(String),

    /// Drug names lacking an expiry, in basket order
    #[error("Missing expiry dates for: {}", drug_names.join(", "))]
    IncompleteExpiry { drug_names: Vec<String> },

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Render failed: {0}")]
    RenderFailure(String),
}

impl From<db::DbError> for LabelStationError {
    fn from(e: db::DbError) -> Self {
        LabelStationError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for LabelStationError {
    fn from(e: serde_json::Error) -> Self {
        LabelStationError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for LabelStationError {
    fn from(e: config::ConfigError) -> Self {
        LabelStationError::ConfigError(e.to_string())
    }
}

impl From<AuditError> for LabelStationError {
    fn from(e: AuditError) -> Self {
        LabelStationError::DatabaseError(e.to_string())
    }
}

impl From<session::SessionError> for LabelStationError {
    fn from(e: session::SessionError) -> Self {
        match e {
            session::SessionError::NoPatientSelected => {
                LabelStationError::NoPatientSelected(e.to_string())
            }
            session::SessionError::NotAuthenticated => {
                LabelStationError::NotAuthenticated(e.to_string())
            }
            session::SessionError::InvalidQuantity(_) => {
                LabelStationError::InvalidInput(e.to_string())
            }
        }
    }
}

impl From<PrintError> for LabelStationError {
    fn from(e: PrintError) -> Self {
        match e {
            PrintError::NoPatientSelected => LabelStationError::NoPatientSelected(e.to_string()),
            PrintError::EmptyBasket => LabelStationError::EmptyBasket(e.to_string()),
            PrintError::IncompleteExpiry(drug_names) => {
                LabelStationError::IncompleteExpiry { drug_names }
            }
            PrintError::NotAuthenticated => LabelStationError::NotAuthenticated(e.to_string()),
            PrintError::RenderFailure(_) => LabelStationError::RenderFailure(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for LabelStationError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        LabelStationError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a station from a JSON configuration document.
#[uniffi::export]
pub fn open_station(config_json: String) -> Result<Arc<LabelStation>, LabelStationError> {
    let config = StationConfig::from_json_str(&config_json)?;
    let db = Database::open(&config.database_path)?;
    Ok(Arc::new(LabelStation::new(db, config)))
}

/// Open a station on an in-memory database (for testing).
#[uniffi::export]
pub fn open_station_in_memory(
    label_output_dir: String,
) -> Result<Arc<LabelStation>, LabelStationError> {
    let config = StationConfig {
        label_output_dir: label_output_dir.into(),
        ..StationConfig::default()
    };
    let db = Database::open_in_memory()?;
    Ok(Arc::new(LabelStation::new(db, config)))
}

/// Selectable expiry months.
#[uniffi::export]
pub fn expiry_month_choices() -> Vec<FfiExpiryChoice> {
    expiry::month_choices().into_iter().map(Into::into).collect()
}

/// Selectable expiry years.
#[uniffi::export]
pub fn expiry_year_choices() -> Vec<FfiExpiryChoice> {
    expiry::year_choices().into_iter().map(Into::into).collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// One operator terminal: database, session and label output.
///
/// Lock order is session, then database, then renderer.
#[derive(uniffi::Object)]
pub struct LabelStation {
    db: Arc<Mutex<Database>>,
    session: Mutex<Session>,
    renderer: Mutex<HtmlFileRenderer>,
    config: StationConfig,
}

impl LabelStation {
    fn new(db: Database, config: StationConfig) -> Self {
        let renderer = HtmlFileRenderer::new(
            config.label_output_dir.clone(),
            HtmlLabelSheet::from_config(&config),
        );
        Self {
            db: Arc::new(Mutex::new(db)),
            session: Mutex::new(Session::default()),
            renderer: Mutex::new(renderer),
            config,
        }
    }
}

#[uniffi::export]
impl LabelStation {
    // =========================================================================
    // Operator Operations
    // =========================================================================

    /// Create an operator account.
    pub fn register_operator(
        &self,
        username: String,
        full_name: String,
        password: String,
    ) -> Result<FfiOperator, LabelStationError> {
        if username.trim().is_empty() || full_name.trim().is_empty() || password.is_empty() {
            return Err(LabelStationError::InvalidInput(
                "username, full name and password are required".into(),
            ));
        }
        let db = self.db.lock()?;
        let operator =
            services::register_operator(&db, username.trim(), full_name.trim(), &password)?;
        Ok(operator.into())
    }

    /// Enable or disable an operator account. Returns `false` if unknown.
    pub fn set_operator_active(
        &self,
        username: String,
        active: bool,
    ) -> Result<bool, LabelStationError> {
        let db = self.db.lock()?;
        Ok(db.set_operator_active(&username, active)?)
    }

    /// Log in, replacing any previous session.
    pub fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<FfiLoginResult, LabelStationError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        match db.login(&username, &password)? {
            LoginOutcome::Success { operator } => {
                let ffi = FfiOperator::from(operator.clone());
                *session = Session::login(operator);
                Ok(FfiLoginResult {
                    success: true,
                    operator: Some(ffi),
                    message: None,
                })
            }
            LoginOutcome::Failure { message } => Ok(FfiLoginResult {
                success: false,
                operator: None,
                message: Some(message),
            }),
        }
    }

    /// End the session, discarding patient and basket.
    pub fn logout(&self) -> Result<(), LabelStationError> {
        self.session.lock()?.logout();
        Ok(())
    }

    /// The logged-in operator, if any.
    pub fn current_operator(&self) -> Result<Option<FfiOperator>, LabelStationError> {
        let session = self.session.lock()?;
        Ok(session.operator().cloned().map(Into::into))
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Add or update a patient record.
    pub fn upsert_patient(&self, patient: FfiPatient) -> Result<(), LabelStationError> {
        let db = self.db.lock()?;
        db.upsert_patient(&patient.into())?;
        Ok(())
    }

    /// Search and select a patient. A miss deselects the current patient.
    pub fn search_patient(
        &self,
        patient_id: String,
        year: String,
    ) -> Result<FfiPatientSearchResult, LabelStationError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        match db.search(&patient_id, &year)? {
            PatientLookup::Found(patient) => {
                let ffi = FfiPatient::from(patient.clone());
                session.set_patient(Some(patient));
                Ok(FfiPatientSearchResult {
                    success: true,
                    patient: Some(ffi),
                    message: None,
                })
            }
            PatientLookup::NotFound { message } => {
                session.set_patient(None);
                Ok(FfiPatientSearchResult {
                    success: false,
                    patient: None,
                    message: Some(message),
                })
            }
        }
    }

    /// The selected patient, if any.
    pub fn selected_patient(&self) -> Result<Option<FfiPatient>, LabelStationError> {
        let session = self.session.lock()?;
        Ok(session.patient().cloned().map(Into::into))
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a catalog medication.
    pub fn upsert_medication(&self, medication: FfiMedication) -> Result<(), LabelStationError> {
        if medication.drug_name.trim().is_empty() {
            return Err(LabelStationError::InvalidInput("drug name cannot be empty".into()));
        }
        let db = self.db.lock()?;
        db.upsert_medication(&medication.into())?;
        Ok(())
    }

    /// Hide a medication from the catalog. Returns `false` if unknown.
    pub fn deactivate_medication(&self, drug_name: String) -> Result<bool, LabelStationError> {
        let db = self.db.lock()?;
        Ok(db.deactivate_medication(&drug_name)?)
    }

    /// All active medications.
    pub fn list_medications(&self) -> Result<Vec<FfiMedication>, LabelStationError> {
        let db = self.db.lock()?;
        let items = MedicationCatalog::list_medications(&*db)?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    /// Medications whose name or instruction contains `term`.
    pub fn search_medications(
        &self,
        term: String,
    ) -> Result<Vec<FfiMedication>, LabelStationError> {
        let db = self.db.lock()?;
        let items = db.search_medications(&term)?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Basket Operations
    // =========================================================================

    /// Add a catalog medication to the basket.
    pub fn add_to_basket(
        &self,
        drug_name: String,
        custom_instruction: Option<String>,
    ) -> Result<FfiBasketEntry, LabelStationError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        let mut medication = db
            .get_medication(&drug_name)?
            .ok_or_else(|| LabelStationError::NotFound(format!("medication {}", drug_name)))?;
        if medication.default_instruction.trim().is_empty() {
            medication.default_instruction = self.config.default_instruction.clone();
        }

        let entry = session.add_medication(&medication, custom_instruction.as_deref())?;
        Ok(entry.into())
    }

    /// Remove an entry. Returns `false` if it was not in the basket.
    pub fn remove_from_basket(&self, entry_id: String) -> Result<bool, LabelStationError> {
        let mut session = self.session.lock()?;
        Ok(session.basket_mut().remove(&entry_id))
    }

    pub fn clear_basket(&self) -> Result<(), LabelStationError> {
        self.session.lock()?.basket_mut().clear();
        Ok(())
    }

    /// Basket entries in label order.
    pub fn list_basket(&self) -> Result<Vec<FfiBasketEntry>, LabelStationError> {
        let session = self.session.lock()?;
        Ok(session.basket().list().iter().map(Into::into).collect())
    }

    /// Set (or with `""` clear) an entry's expiry month.
    pub fn set_expiry_month(
        &self,
        entry_id: String,
        month: String,
    ) -> Result<FfiBasketEntry, LabelStationError> {
        let mut session = self.session.lock()?;
        let basket = session.basket_mut();
        if !basket.set_expiry_month(&entry_id, &month) {
            return Err(LabelStationError::NotFound(format!("basket entry {}", entry_id)));
        }
        Self::entry(basket, &entry_id)
    }

    /// Set (or with `""` clear) an entry's expiry year.
    pub fn set_expiry_year(
        &self,
        entry_id: String,
        year: String,
    ) -> Result<FfiBasketEntry, LabelStationError> {
        let mut session = self.session.lock()?;
        let basket = session.basket_mut();
        if !basket.set_expiry_year(&entry_id, &year) {
            return Err(LabelStationError::NotFound(format!("basket entry {}", entry_id)));
        }
        Self::entry(basket, &entry_id)
    }

    /// Labels per entry, `1..=max_print_quantity`.
    pub fn set_print_quantity(&self, quantity: u32) -> Result<(), LabelStationError> {
        let q = PrintQuantity::new(quantity, self.config.max_print_quantity)
            .ok_or(session::SessionError::InvalidQuantity(quantity))?;
        self.session.lock()?.set_print_quantity(q);
        Ok(())
    }

    /// Lenient variant for raw text input. Returns the quantity applied.
    pub fn set_print_quantity_from_input(&self, input: String) -> Result<u32, LabelStationError> {
        let q = PrintQuantity::from_input(&input, self.config.max_print_quantity);
        self.session.lock()?.set_print_quantity(q);
        Ok(q.get())
    }

    pub fn print_summary(&self) -> Result<FfiPrintSummary, LabelStationError> {
        let session = self.session.lock()?;
        Ok(session.summary().into())
    }

    // =========================================================================
    // Print Operations
    // =========================================================================

    /// Render labels, record the audit batch and clear the basket.
    ///
    /// An audit failure does not fail the call; see `audit_warning`.
    pub fn print_labels(&self) -> Result<FfiPrintReceipt, LabelStationError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        let mut renderer = self.renderer.lock()?;

        let receipt = {
            let mut orchestrator = PrintOrchestrator::new(&mut *renderer, AuditLedger::new(&db));
            orchestrator.print(&mut session)?
        };

        Ok(FfiPrintReceipt {
            print_session_id: receipt.print_session_id.clone(),
            entry_count: u32::try_from(receipt.entry_count).unwrap_or(u32::MAX),
            label_count: u32::try_from(receipt.label_count).unwrap_or(u32::MAX),
            audit_recorded: receipt.audit_warning().is_none(),
            audit_warning: receipt.audit_warning().map(str::to_string),
            output_path: renderer.last_output().map(|p| p.display().to_string()),
        })
    }

    // =========================================================================
    // Audit Operations
    // =========================================================================

    /// Every audit record in append order (empty if the log is unreadable).
    pub fn list_audit_records(&self) -> Result<Vec<FfiAuditRecord>, LabelStationError> {
        let db = self.db.lock()?;
        let ledger = AuditLedger::new(&db);
        Ok(ledger.load_all().into_iter().map(Into::into).collect())
    }

    /// The last `count` audit records, oldest first.
    pub fn recent_audit_records(
        &self,
        count: u32,
    ) -> Result<Vec<FfiAuditRecord>, LabelStationError> {
        let db = self.db.lock()?;
        let ledger = AuditLedger::new(&db);
        Ok(ledger
            .recent(count as usize)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Erase the audit log. `confirmed` must be true.
    pub fn clear_audit_log(&self, confirmed: bool) -> Result<u32, LabelStationError> {
        if !confirmed {
            return Err(LabelStationError::InvalidInput(
                "clearing the audit log requires confirmation".into(),
            ));
        }
        let db = self.db.lock()?;
        let removed = AuditLedger::new(&db).clear_all()?;
        Ok(removed as u32)
    }

    /// Export the audit log as JSON.
    pub fn export_audit_json(&self) -> Result<String, LabelStationError> {
        let db = self.db.lock()?;
        let ledger = AuditLedger::new(&db);
        let export = export::AuditExporter::new(&ledger).export_all()?;
        Ok(export.to_json()?)
    }

    /// Export the audit log as CSV.
    pub fn export_audit_csv(&self) -> Result<String, LabelStationError> {
        let db = self.db.lock()?;
        let ledger = AuditLedger::new(&db);
        let export = export::AuditExporter::new(&ledger).export_all()?;
        Ok(export.to_csv())
    }
}

impl LabelStation {
    fn entry(basket: &BasketStore, entry_id: &str) -> Result<FfiBasketEntry, LabelStationError> {
        basket
            .get(entry_id)
            .map(Into::into)
            .ok_or_else(|| LabelStationError::NotFound(format!("basket entry {}", entry_id)))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe operator.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOperator {
    pub id: String,
    pub username: String,
    pub full_name: String,
}

impl From<Operator> for FfiOperator {
    fn from(op: Operator) -> Self {
        Self {
            id: op.id,
            username: op.username,
            full_name: op.full_name,
        }
    }
}

/// FFI-safe login result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLoginResult {
    pub success: bool,
    pub operator: Option<FfiOperator>,
    pub message: Option<String>,
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub patient_id: String,
    pub year: String,
    pub name: String,
    pub national_id: Option<String>,
    /// Read-only; ignored on upsert
    pub full_id: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            full_id: patient.full_id(),
            patient_id: patient.patient_id,
            year: patient.year,
            name: patient.name,
            national_id: patient.national_id,
        }
    }
}

impl From<FfiPatient> for Patient {
    fn from(patient: FfiPatient) -> Self {
        Patient {
            patient_id: patient.patient_id,
            year: patient.year,
            name: patient.name,
            national_id: patient.national_id,
        }
    }
}

/// FFI-safe patient search result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSearchResult {
    pub success: bool,
    pub patient: Option<FfiPatient>,
    pub message: Option<String>,
}

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub drug_name: String,
    pub default_instruction: String,
    pub code: Option<String>,
}

impl From<Medication> for FfiMedication {
    fn from(m: Medication) -> Self {
        Self {
            drug_name: m.drug_name,
            default_instruction: m.default_instruction,
            code: m.code,
        }
    }
}

impl From<FfiMedication> for Medication {
    fn from(m: FfiMedication) -> Self {
        Medication {
            drug_name: m.drug_name.trim().to_string(),
            default_instruction: m.default_instruction,
            code: m.code,
        }
    }
}

/// FFI-safe basket entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBasketEntry {
    pub id: String,
    pub drug_name: String,
    pub instruction_text: String,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    /// Derived `MM/YY`, present iff month and year are both set
    pub expiry_date: Option<String>,
}

impl From<&BasketEntry> for FfiBasketEntry {
    fn from(e: &BasketEntry) -> Self {
        Self {
            id: e.id.clone(),
            drug_name: e.drug_name.clone(),
            instruction_text: e.instruction_text.clone(),
            expiry_month: e.expiry_month().map(str::to_string),
            expiry_year: e.expiry_year().map(str::to_string),
            expiry_date: e.expiry_date(),
        }
    }
}

/// FFI-safe expiry choice.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExpiryChoice {
    pub value: String,
    pub label: String,
}

impl From<expiry::ExpiryChoice> for FfiExpiryChoice {
    fn from(c: expiry::ExpiryChoice) -> Self {
        Self {
            value: c.value,
            label: c.label,
        }
    }
}

/// FFI-safe print summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrintSummary {
    pub patient_name: Option<String>,
    pub medication_count: u32,
    pub total_labels: u32,
    pub expiry_set: u32,
    pub ready: bool,
}

impl From<session::PrintSummary> for FfiPrintSummary {
    fn from(s: session::PrintSummary) -> Self {
        Self {
            patient_name: s.patient_name,
            medication_count: s.medication_count,
            total_labels: s.total_labels,
            expiry_set: s.expiry_set,
            ready: s.ready,
        }
    }
}

/// FFI-safe print receipt.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrintReceipt {
    pub print_session_id: String,
    pub entry_count: u32,
    pub label_count: u32,
    pub audit_recorded: bool,
    pub audit_warning: Option<String>,
    pub output_path: Option<String>,
}

/// FFI-safe audit record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAuditRecord {
    pub id: String,
    pub timestamp: String,
    pub print_session_id: String,
    pub patient_id: String,
    pub patient_year: String,
    pub patient_name: String,
    pub drug_name: String,
    pub instruction_text: String,
    pub printed_by: String,
    pub expiry_date: String,
    pub print_quantity: u32,
    pub status: String,
}

impl From<AuditRecord> for FfiAuditRecord {
    fn from(r: AuditRecord) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp,
            print_session_id: r.print_session_id,
            patient_id: r.patient_id,
            patient_year: r.patient_year,
            patient_name: r.patient_name,
            drug_name: r.drug_name,
            instruction_text: r.instruction_text,
            printed_by: r.printed_by,
            expiry_date: r.expiry_date,
            print_quantity: r.print_quantity,
            status: r.status.as_str().to_string(),
        }
    }
}
