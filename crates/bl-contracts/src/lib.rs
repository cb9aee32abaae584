//! # bl-contracts
//!
//! Contract validation objects, one family per mutating operation. A
//! contract holds the authenticated caller and answers two questions
//! separately: may this caller attempt the operation at all (`authorize`),
//! and is this input acceptable (`validate`).

pub mod base;
pub mod budgets;
pub mod milestones;
pub mod payments;
pub mod risks;
pub mod weekly_updates;

pub use base::{Contract, ValidationResult};
