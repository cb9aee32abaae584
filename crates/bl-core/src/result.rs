//! Result type aliases

use crate::error::BlError;

/// Standard Result type for BuildLedger operations
pub type BlResult<T> = Result<T, BlError>;
