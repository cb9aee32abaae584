//! # bl-services
//!
//! Service objects: one per mutating operation, each following the same
//! shape — authorize and validate through the operation's contract, apply
//! the change through the store ports, journal what the domain flags for
//! audit, and hand back the recomputed view. Read-side composition lives in
//! [`views`]; the risk-analysis boundary in [`analysis`].

pub mod analysis;
pub mod budgets;
pub mod milestones;
pub mod payments;
pub mod risks;
pub mod views;
pub mod weekly_updates;
