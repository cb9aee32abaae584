//! Input parameter objects for mutating operations
//!
//! Declarative bounds (non-negative amounts, 0..=100 progress, 1..=4
//! quarter) live here as `validator` annotations; cross-field and
//! domain-state rules live in `bl-contracts`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use bl_core::traits::Id;

use crate::budget::{BudgetCategory, CategoryAllocations};
use crate::risk::{RiskCategory, RiskLevel};
use crate::weekly_update::ItemizedExpense;

/// Parameters for creating or editing a milestone
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneParams {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Option<Id>,
    pub due_date: Option<NaiveDate>,

    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub labour_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub material_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub diesel_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub rent_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub admin_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub other_operational_cost: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub budget_allocated: f64,
}

/// Parameters for recording or editing a weekly update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyUpdateParams {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,

    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub labour_expenditure: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub material_expenditure: f64,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub other_expenditure: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub progress_percentage: f64,

    pub work_done: Option<String>,
    pub challenges: Option<String>,
    pub successes: Option<String>,
    pub next_week_plan: Option<String>,
    pub notes: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub items: Vec<ItemizedExpense>,
}

/// Parameters for creating or editing a risk
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RiskParams {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub description: String,
    pub category: RiskCategory,
    pub probability: RiskLevel,
    pub impact: RiskLevel,
    pub mitigation_strategy: Option<String>,
}

/// Parameters for creating a building budget
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetParams {
    pub building_id: Id,
    #[validate(range(min = 2000, max = 2200, message = "is not a plausible fiscal year"))]
    pub fiscal_year: i32,
    #[validate(range(min = 1, max = 4, message = "must be between 1 and 4"))]
    pub quarter: Option<i32>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub allocations: CategoryAllocations,
}

/// Parameters for appending a budget expense
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetExpenseParams {
    pub category: BudgetCategory,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Parameters for submitting a payment request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestParams {
    pub milestone_id: Id,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub calculated_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_expenditure_rejected() {
        let params = WeeklyUpdateParams {
            labour_expenditure: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_progress_bounds() {
        let mut params = WeeklyUpdateParams::default();
        params.progress_percentage = 100.0;
        assert!(params.validate().is_ok());

        params.progress_percentage = 100.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_quarter_bounds() {
        let base = BudgetParams {
            building_id: 1,
            fiscal_year: 2026,
            quarter: Some(4),
            period_start: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            allocations: CategoryAllocations::default(),
        };
        assert!(base.validate().is_ok());

        let bad = BudgetParams {
            quarter: Some(5),
            ..base
        };
        assert!(bad.validate().is_err());
    }
}
