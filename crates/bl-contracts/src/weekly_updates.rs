//! Contracts for recording and editing weekly updates
//!
//! This is where the overspend-justification invariant is enforced: an
//! itemized line with `actual_spent > quoted_amount` and no reason blocks
//! the whole submission. Normalization while editing is the model's job;
//! refusing to commit an unjustified overspend is this contract's.

use bl_core::error::ValidationErrors;
use bl_core::user::UserContext;
use bl_models::params::WeeklyUpdateParams;

use crate::base::{run_derive_validation, Contract, ValidationResult};

/// Contract for submitting (or editing) a weekly update with its items
pub struct WeeklyUpdateContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> WeeklyUpdateContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }

    fn validate_week_range(&self, params: &WeeklyUpdateParams, errors: &mut ValidationErrors) {
        if params.week_end_date < params.week_start_date {
            errors.add("week_end_date", "must be on or after week_start_date");
        }
    }

    fn validate_items(&self, params: &WeeklyUpdateParams, errors: &mut ValidationErrors) {
        for (index, item) in params.items.iter().enumerate() {
            if item.description.trim().is_empty() {
                errors.add(format!("items[{}].description", index), "can't be blank");
            }
            if item.quoted_amount < 0.0 {
                errors.add(
                    format!("items[{}].quoted_amount", index),
                    "must be greater than or equal to 0",
                );
            }
            if item.actual_spent < 0.0 {
                errors.add(
                    format!("items[{}].actual_spent", index),
                    "must be greater than or equal to 0",
                );
            }
            if item.needs_justification() {
                errors.add(
                    format!("items[{}].reason_for_overspend", index),
                    "is required when actual spend exceeds the quoted amount",
                );
            }
        }
    }
}

impl<'a> Contract<WeeklyUpdateParams> for WeeklyUpdateContract<'a> {
    fn validate(&self, params: &WeeklyUpdateParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        self.validate_week_range(params, &mut errors);
        self.validate_items(params, &mut errors);
        errors.into_result()
    }
}
