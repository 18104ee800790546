//! Collaborators around the print core: operator login, patient lookup and
//! the medication catalog.
//!
//! Each collaborator is a trait so hosts can plug in their own backends;
//! the SQLite [`Database`](crate::db::Database) implements all three.

mod auth;
mod catalog;
mod patients;

pub use auth::*;
pub use catalog::*;
pub use patients::*;
