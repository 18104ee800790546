//! Print orchestration: validate the session, render, audit, reset.

mod orchestrator;
mod state;

pub use orchestrator::*;
pub use state::*;
