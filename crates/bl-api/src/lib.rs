//! # bl-api
//!
//! HTTP surface for BuildLedger RS: axum routers and handlers over the
//! service layer. Identity arrives pre-verified as headers; every engine
//! error maps to a status through its own [`bl_core::error::BlError`]
//! classification.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
