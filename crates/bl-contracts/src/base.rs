//! Base contract machinery

use bl_core::error::{BlError, ValidationErrors};
use bl_core::result::BlResult;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Role/capability gate. Runs before validation; a failure here is
    /// `Forbidden`, not a validation error.
    fn authorize(&self) -> BlResult<()> {
        Ok(())
    }

    /// Validate the input
    fn validate(&self, input: &T) -> ValidationResult;

    /// Authorize, then validate, mapping both failure modes into [`BlError`].
    fn check(&self, input: &T) -> BlResult<()> {
        self.authorize()?;
        self.validate(input).map_err(BlError::Validation)
    }
}

/// Fold the `validator` crate's derive output into our field-keyed map.
pub fn merge_validator_errors(target: &mut ValidationErrors, source: &validator::ValidationErrors) {
    for (field, field_errors) in source.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            target.add(field.to_string(), message);
        }
    }
}

/// Run a `Validate` derive and fold any failures into `errors`.
pub fn run_derive_validation<T: validator::Validate>(errors: &mut ValidationErrors, input: &T) {
    if let Err(derive_errors) = input.validate() {
        merge_validator_errors(errors, &derive_errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
        amount: f64,
    }

    #[test]
    fn test_merge_validator_errors() {
        let probe = Probe { amount: -3.0 };
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, &probe);
        assert_eq!(
            errors.get("amount").map(|v| v[0].as_str()),
            Some("must be greater than or equal to 0")
        );
    }
}
