//! Append-only audit trail of printed labels.

mod ledger;

pub use ledger::*;
