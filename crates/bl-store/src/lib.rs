//! # bl-store
//!
//! Persistence ports (async store traits) and an in-memory reference
//! implementation. Services talk to the ports only; `bl-db` provides the
//! PostgreSQL implementations and the memory store backs tests and
//! development mode.

pub mod memory;
pub mod ports;

pub use memory::MemoryStore;
pub use ports::*;
