//! Contracts for building budgets and their expense ledger

use bl_core::error::ValidationErrors;
use bl_core::user::UserContext;
use bl_models::budget::CategoryAllocations;
use bl_models::params::{BudgetExpenseParams, BudgetParams};

use crate::base::{run_derive_validation, Contract, ValidationResult};

fn validate_allocations(allocations: &CategoryAllocations, errors: &mut ValidationErrors) {
    let fields: [(&str, f64); 8] = [
        ("preventative_maintenance", allocations.preventative_maintenance),
        ("reactive_maintenance", allocations.reactive_maintenance),
        ("corrective_maintenance", allocations.corrective_maintenance),
        ("capital_expenditure", allocations.capital_expenditure),
        ("utilities", allocations.utilities),
        ("insurance", allocations.insurance),
        ("property_tax", allocations.property_tax),
        ("other", allocations.other),
    ];
    for (name, amount) in fields {
        if amount < 0.0 {
            errors.add(
                format!("allocations.{}", name),
                "must be greater than or equal to 0",
            );
        }
    }
}

/// Contract for creating a budget
pub struct CreateBudgetContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> CreateBudgetContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<BudgetParams> for CreateBudgetContract<'a> {
    fn validate(&self, params: &BudgetParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        if params.period_end < params.period_start {
            errors.add("period_end", "must be on or after period_start");
        }
        validate_allocations(&params.allocations, &mut errors);
        errors.into_result()
    }
}

/// Contract for editing a budget's allocations
pub struct UpdateAllocationsContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> UpdateAllocationsContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<CategoryAllocations> for UpdateAllocationsContract<'a> {
    fn validate(&self, allocations: &CategoryAllocations) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_allocations(allocations, &mut errors);
        errors.into_result()
    }
}

/// Contract for appending an expense to a budget's ledger
pub struct AddExpenseContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> AddExpenseContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<BudgetExpenseParams> for AddExpenseContract<'a> {
    fn validate(&self, params: &BudgetExpenseParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::user::Role;
    use bl_models::budget::BudgetCategory;
    use chrono::NaiveDate;

    fn user() -> UserContext {
        UserContext::new(1, Role::PropertyManager)
    }

    fn valid_budget() -> BudgetParams {
        BudgetParams {
            building_id: 1,
            fiscal_year: 2026,
            quarter: None,
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            allocations: CategoryAllocations::default(),
        }
    }

    #[test]
    fn test_valid_budget_passes() {
        let user = user();
        assert!(CreateBudgetContract::new(&user)
            .validate(&valid_budget())
            .is_ok());
    }

    #[test]
    fn test_reversed_period_rejected() {
        let user = user();
        let mut params = valid_budget();
        std::mem::swap(&mut params.period_start, &mut params.period_end);
        let errors = CreateBudgetContract::new(&user)
            .validate(&params)
            .unwrap_err();
        assert!(errors.has_error("period_end"));
    }

    #[test]
    fn test_negative_allocation_rejected() {
        let user = user();
        let mut params = valid_budget();
        params.allocations.utilities = -100.0;
        let errors = CreateBudgetContract::new(&user)
            .validate(&params)
            .unwrap_err();
        assert!(errors.has_error("allocations.utilities"));
    }

    #[test]
    fn test_negative_expense_rejected() {
        let user = user();
        let params = BudgetExpenseParams {
            category: BudgetCategory::Utilities,
            amount: -5.0,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: None,
        };
        let errors = AddExpenseContract::new(&user).validate(&params).unwrap_err();
        assert!(errors.has_error("amount"));
    }
}
