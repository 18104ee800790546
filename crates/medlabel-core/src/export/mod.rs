//! Export of the audit log for compliance review.

mod audit;

pub use audit::*;
