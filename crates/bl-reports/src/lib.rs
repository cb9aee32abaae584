//! # bl-reports
//!
//! Pure read-side rollups. Every function here recomputes from the raw
//! records it is handed; nothing is cached and nothing is written back.
//! Keeping aggregation out of the entities eliminates the stale-running-
//! total class of bug at the cost of an O(n) walk per read, which is
//! acceptable at this domain's volumes (tens of records, not millions).

pub mod budget;
pub mod milestone;
pub mod portfolio;

pub use budget::*;
pub use milestone::*;
pub use portfolio::*;
