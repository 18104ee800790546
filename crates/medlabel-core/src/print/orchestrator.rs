//! The print action.

use tracing::{info, instrument, warn};

use super::state::{AuditOutcome, PrintError, PrintReceipt, PrintState};
use crate::audit::{AuditLog, PrintContext};
use crate::render::{LabelJob, LabelRenderer};
use crate::session::Session;

/// Runs one print action at a time against a session.
///
/// Ordering is render, then audit, then clear the basket. A render failure
/// leaves the session untouched. An audit failure after a successful render
/// still clears the basket and is reported on the receipt.
pub struct PrintOrchestrator<R, A> {
    renderer: R,
    audit: A,
    state: PrintState,
    transitions: Vec<PrintState>,
}

impl<R: LabelRenderer, A: AuditLog> PrintOrchestrator<R, A> {
    pub fn new(renderer: R, audit: A) -> Self {
        Self {
            renderer,
            audit,
            state: PrintState::Idle,
            transitions: Vec::new(),
        }
    }

    /// Current state; `Idle` between actions.
    pub fn state(&self) -> PrintState {
        self.state
    }

    /// States entered during the last print action, in order.
    pub fn transitions(&self) -> &[PrintState] {
        &self.transitions
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Print every basket entry of `session`.
    #[instrument(skip_all, fields(entries = session.basket().len()))]
    pub fn print(&mut self, session: &mut Session) -> Result<PrintReceipt, PrintError> {
        self.transitions.clear();
        self.enter(PrintState::Validating);

        let context = match Self::validate(session) {
            Ok(context) => context,
            Err(e) => {
                info!(reason = %e, "Print blocked");
                self.enter(PrintState::Blocked);
                self.enter(PrintState::Idle);
                return Err(e);
            }
        };

        // Snapshot before rendering; this is exactly what gets audited
        let entries = session.basket().list().to_vec();

        self.enter(PrintState::Rendering);
        let job = LabelJob {
            print_session_id: &context.print_session_id,
            patient: &context.patient,
            entries: &entries,
            print_quantity: context.print_quantity,
        };
        let label_count = job.label_count();
        if let Err(e) = self.renderer.render(&job) {
            warn!(error = %e, "Render failed, basket kept for retry");
            self.enter(PrintState::Idle);
            return Err(PrintError::RenderFailure(e));
        }

        self.enter(PrintState::Auditing);
        let audit = match self.audit.append_batch(&entries, &context) {
            Ok(records) => AuditOutcome::Recorded { records },
            Err(e) => {
                warn!(
                    error = %e,
                    print_session_id = %context.print_session_id,
                    "Labels printed but audit append failed"
                );
                AuditOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.enter(PrintState::Resetting);
        session.basket_mut().clear();
        self.enter(PrintState::Idle);

        info!(
            print_session_id = %context.print_session_id,
            labels = label_count,
            "Labels printed"
        );

        Ok(PrintReceipt {
            print_session_id: context.print_session_id,
            entry_count: entries.len(),
            label_count,
            audit,
        })
    }

    /// Preconditions, first failure wins.
    fn validate(session: &Session) -> Result<PrintContext, PrintError> {
        let patient = session.patient().ok_or(PrintError::NoPatientSelected)?;

        if session.basket().is_empty() {
            return Err(PrintError::EmptyBasket);
        }

        let missing = session.basket().missing_expiry();
        if !missing.is_empty() {
            return Err(PrintError::IncompleteExpiry(missing));
        }

        let operator = session.operator().ok_or(PrintError::NotAuthenticated)?;

        Ok(PrintContext::new(
            patient.snapshot(),
            operator.full_name.clone(),
            session.print_quantity(),
        ))
    }

    fn enter(&mut self, state: PrintState) {
        self.state = state;
        self.transitions.push(state);
    }
}
