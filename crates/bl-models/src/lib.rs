//! # bl-models
//!
//! Domain models for BuildLedger RS: projects, milestones, weekly updates
//! with itemized expenses, risks, payment requests, buildings and building
//! budgets.
//!
//! Models hold data and the per-entity invariants (derived cost fields,
//! overspend normalization, status transition validators). Rollups across
//! entities live in `bl-reports`; persistence lives behind `bl-store`.

pub mod budget;
pub mod building;
pub mod income;
pub mod journal;
pub mod milestone;
pub mod params;
pub mod payment_request;
pub mod project;
pub mod risk;
pub mod weekly_update;

pub use budget::*;
pub use building::*;
pub use income::*;
pub use journal::*;
pub use milestone::*;
pub use params::*;
pub use payment_request::*;
pub use project::*;
pub use risk::*;
pub use weekly_update::*;
