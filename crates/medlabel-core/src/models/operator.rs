//! Operator (pharmacist) identity.

use serde::{Deserialize, Serialize};

/// An authenticated operator. Printed-by fields in the audit log use
/// `full_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: String,
    pub username: String,
    pub full_name: String,
}
