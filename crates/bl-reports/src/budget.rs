//! Building budget rollup
//!
//! Budget-period health is a different classifier from the milestone band:
//! any negative remainder is OVER_BUDGET outright. A 110%-utilized budget
//! is a failure here, not a tolerated overrun.

use std::collections::HashMap;

use serde::Serialize;

use bl_models::budget::{BudgetCategory, BudgetExpense, BudgetStatus, BuildingBudget};

use crate::milestone::BudgetHealth;

/// Spend against one category, with its allocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: BudgetCategory,
    pub allocated: f64,
    pub spent: f64,
    pub remaining: f64,
}

/// Fully rolled-up view of one budget period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub fiscal_year: i32,
    pub quarter: Option<i32>,
    pub status: BudgetStatus,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    /// Percentage; 0 when the budget is empty
    pub utilization: f64,
    pub health: BudgetHealth,
    pub by_category: Vec<CategorySpend>,
    pub expense_count: usize,
}

/// Strict budget-period classifier: spent past the total is over, exactly
/// on a non-zero total is at, anything else is under.
pub fn classify_budget_spend(total_spent: f64, total_budget: f64) -> BudgetHealth {
    if total_spent > total_budget {
        BudgetHealth::OverBudget
    } else if total_spent == total_budget && total_budget > 0.0 {
        BudgetHealth::AtBudget
    } else {
        BudgetHealth::UnderBudget
    }
}

/// Recompute a budget period's totals from its expense ledger.
pub fn summarize(budget: &BuildingBudget, expenses: &[BudgetExpense]) -> BudgetSummary {
    let total_budget = budget.total_budget();
    let total_spent: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut spent_by_category: HashMap<BudgetCategory, f64> = HashMap::new();
    for expense in expenses {
        *spent_by_category.entry(expense.category).or_insert(0.0) += expense.amount;
    }

    let by_category = BudgetCategory::ALL
        .iter()
        .map(|&category| {
            let allocated = budget.allocations.amount_for(category);
            let spent = spent_by_category.get(&category).copied().unwrap_or(0.0);
            CategorySpend {
                category,
                allocated,
                spent,
                remaining: allocated - spent,
            }
        })
        .collect();

    let utilization = if total_budget > 0.0 {
        total_spent / total_budget * 100.0
    } else {
        0.0
    };

    BudgetSummary {
        fiscal_year: budget.fiscal_year,
        quarter: budget.quarter,
        status: budget.status,
        total_budget,
        total_spent,
        total_remaining: total_budget - total_spent,
        utilization,
        health: classify_budget_spend(total_spent, total_budget),
        by_category,
        expense_count: expenses.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_models::budget::CategoryAllocations;
    use chrono::NaiveDate;

    fn expense(category: BudgetCategory, amount: f64) -> BudgetExpense {
        BudgetExpense {
            id: None,
            budget_id: 1,
            category,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            description: None,
            created_at: None,
        }
    }

    fn fifty_thousand_budget() -> BuildingBudget {
        BuildingBudget {
            fiscal_year: 2026,
            allocations: CategoryAllocations {
                preventative_maintenance: 10_000.0,
                reactive_maintenance: 8_000.0,
                corrective_maintenance: 7_000.0,
                capital_expenditure: 12_000.0,
                utilities: 5_000.0,
                insurance: 4_000.0,
                property_tax: 3_000.0,
                other: 1_000.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_overrun_scenario() {
        // 50000 budget, expenses 10000 + 20000 + 25000 -> spent 55000,
        // remaining -5000, 110% utilization, OVER_BUDGET.
        let budget = fifty_thousand_budget();
        let expenses = vec![
            expense(BudgetCategory::CapitalExpenditure, 10_000.0),
            expense(BudgetCategory::Utilities, 20_000.0),
            expense(BudgetCategory::ReactiveMaintenance, 25_000.0),
        ];

        let summary = summarize(&budget, &expenses);
        assert_eq!(summary.total_budget, 50_000.0);
        assert_eq!(summary.total_spent, 55_000.0);
        assert_eq!(summary.total_remaining, -5_000.0);
        assert_eq!(summary.utilization, 110.0);
        assert_eq!(summary.health, BudgetHealth::OverBudget);
    }

    #[test]
    fn test_per_category_breakdown() {
        let budget = fifty_thousand_budget();
        let expenses = vec![
            expense(BudgetCategory::Utilities, 2_000.0),
            expense(BudgetCategory::Utilities, 1_500.0),
        ];

        let summary = summarize(&budget, &expenses);
        let utilities = summary
            .by_category
            .iter()
            .find(|c| c.category == BudgetCategory::Utilities)
            .unwrap();
        assert_eq!(utilities.allocated, 5_000.0);
        assert_eq!(utilities.spent, 3_500.0);
        assert_eq!(utilities.remaining, 1_500.0);

        let insurance = summary
            .by_category
            .iter()
            .find(|c| c.category == BudgetCategory::Insurance)
            .unwrap();
        assert_eq!(insurance.spent, 0.0);
    }

    #[test]
    fn test_strict_classifier_boundaries() {
        assert_eq!(
            classify_budget_spend(50_000.0, 50_000.0),
            BudgetHealth::AtBudget
        );
        assert_eq!(
            classify_budget_spend(50_000.01, 50_000.0),
            BudgetHealth::OverBudget
        );
        assert_eq!(
            classify_budget_spend(49_999.99, 50_000.0),
            BudgetHealth::UnderBudget
        );
        // An empty budget with no spend is under, not at.
        assert_eq!(classify_budget_spend(0.0, 0.0), BudgetHealth::UnderBudget);
    }

    #[test]
    fn test_empty_budget_zero_guard() {
        let budget = BuildingBudget::default();
        let summary = summarize(&budget, &[]);
        assert_eq!(summary.utilization, 0.0);
        assert_eq!(summary.health, BudgetHealth::UnderBudget);
    }
}
