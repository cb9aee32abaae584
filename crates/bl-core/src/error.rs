//! Core error types for BuildLedger RS
//!
//! All engine operations report failures through [`BlError`]. Validation
//! failures carry a field-keyed [`ValidationErrors`] collection so callers
//! can identify the failing field, not just that "something" was wrong.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all BuildLedger operations
#[derive(Error, Debug)]
pub enum BlError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid state: {entity} is {current}, cannot {attempted}")]
    InvalidState {
        entity: &'static str,
        current: String,
        attempted: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },
}

impl BlError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        BlError::NotFound { entity, id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        BlError::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid_state(
        entity: &'static str,
        current: impl Into<String>,
        attempted: impl Into<String>,
    ) -> Self {
        BlError::InvalidState {
            entity,
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    /// HTTP status code mapping for errors
    pub fn status_code(&self) -> u16 {
        match self {
            BlError::NotFound { .. } => 404,
            BlError::Forbidden { .. } => 403,
            BlError::Validation(_) => 422,
            BlError::InvalidState { .. } => 409,
            BlError::Database(_) | BlError::Internal(_) | BlError::Config(_) => 500,
            BlError::ExternalService { .. } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BlError::NotFound { .. } => "not_found",
            BlError::Forbidden { .. } => "forbidden",
            BlError::Validation(_) => "validation_failed",
            BlError::InvalidState { .. } => "invalid_state",
            BlError::Database(_) => "database_error",
            BlError::Internal(_) => "internal_error",
            BlError::Config(_) => "configuration_error",
            BlError::ExternalService { .. } => "external_service_error",
        }
    }
}

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// Finish a validation pass: empty map is Ok, anything else is Err(self).
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
