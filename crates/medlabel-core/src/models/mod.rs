//! Domain models for the label station.

mod audit;
mod basket;
mod catalog;
mod operator;
mod patient;

pub use audit::*;
pub use basket::*;
pub use catalog::*;
pub use operator::*;
pub use patient::*;
