//! Building budget services
//!
//! Totals are never written: `total_budget` is the sum of the eight
//! allocations, spend comes from the expense ledger, and every read that
//! needs them goes through `bl_reports::budget::summarize`. Status changes
//! are journaled.

use tracing::info;

use bl_contracts::base::Contract;
use bl_contracts::budgets::{AddExpenseContract, CreateBudgetContract, UpdateAllocationsContract};
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_core::user::UserContext;
use bl_models::budget::{
    BudgetExpense, BudgetStatus, BuildingBudget, CategoryAllocations,
};
use bl_models::journal::{JournalEntry, JournalKind};
use bl_models::params::{BudgetExpenseParams, BudgetParams};
use bl_reports::budget::{summarize, BudgetSummary};
use bl_store::Stores;

pub struct CreateBudgetService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> CreateBudgetService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, params: BudgetParams) -> BlResult<BuildingBudget> {
        self.stores.buildings.find(params.building_id).await?;
        CreateBudgetContract::new(self.user).check(&params)?;

        let budget = BuildingBudget {
            id: None,
            building_id: params.building_id,
            fiscal_year: params.fiscal_year,
            quarter: params.quarter,
            period_start: params.period_start,
            period_end: params.period_end,
            allocations: params.allocations,
            status: BudgetStatus::Draft,
            created_at: None,
            updated_at: None,
        };
        let budget = self.stores.budgets.create(budget).await?;
        info!(
            budget_id = budget.id,
            building_id = budget.building_id,
            fiscal_year = budget.fiscal_year,
            total_budget = budget.total_budget(),
            "budget created"
        );
        Ok(budget)
    }
}

pub struct UpdateAllocationsService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateAllocationsService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(
        &self,
        budget_id: Id,
        allocations: CategoryAllocations,
    ) -> BlResult<BuildingBudget> {
        let mut budget = self.stores.budgets.find(budget_id).await?;
        UpdateAllocationsContract::new(self.user).check(&allocations)?;

        budget.allocations = allocations;
        self.stores.budgets.update(budget).await
    }
}

pub struct AddBudgetExpenseService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> AddBudgetExpenseService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    /// Appends the expense and returns the budget summary recomputed over
    /// the full ledger, so the caller sees the updated totals in one call.
    pub async fn call(
        &self,
        budget_id: Id,
        params: BudgetExpenseParams,
    ) -> BlResult<BudgetSummary> {
        let budget = self.stores.budgets.find(budget_id).await?;
        AddExpenseContract::new(self.user).check(&params)?;

        let expense = BudgetExpense {
            id: None,
            budget_id,
            category: params.category,
            amount: params.amount,
            date: params.date,
            description: params.description,
            created_at: None,
        };
        self.stores.budgets.add_expense(expense).await?;

        let expenses = self.stores.budgets.list_expenses(budget_id).await?;
        let summary = summarize(&budget, &expenses);
        info!(
            budget_id,
            category = params.category.as_str(),
            amount = params.amount,
            total_spent = summary.total_spent,
            "budget expense recorded"
        );
        Ok(summary)
    }
}

pub struct UpdateBudgetStatusService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateBudgetStatusService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, budget_id: Id, status: BudgetStatus) -> BlResult<BuildingBudget> {
        let mut budget = self.stores.budgets.find(budget_id).await?;
        let previous = budget.status;
        budget.status = status;
        let budget = self.stores.budgets.update(budget).await?;

        if previous != status {
            self.stores
                .journals
                .append(
                    JournalEntry::new(
                        JournalKind::BuildingBudget,
                        budget_id,
                        self.user.user_id,
                        "status_changed",
                    )
                    .with_detail(format!("{} -> {}", previous.as_str(), status.as_str())),
                )
                .await?;
        }
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::error::BlError;
    use bl_core::user::Role;
    use bl_models::budget::BudgetCategory;
    use bl_models::building::Building;
    use bl_reports::milestone::BudgetHealth;
    use chrono::NaiveDate;

    async fn setup() -> (UserContext, Stores, Id) {
        let user = UserContext::new(1, Role::PropertyManager);
        let stores = Stores::in_memory();
        let building = stores
            .buildings
            .create(Building::new("Riverside Court", 24))
            .await
            .unwrap();
        (user, stores, building.id.unwrap())
    }

    fn annual_params(building_id: Id) -> BudgetParams {
        BudgetParams {
            building_id,
            fiscal_year: 2026,
            quarter: None,
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
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
        }
    }

    fn expense(category: BudgetCategory, amount: f64) -> BudgetExpenseParams {
        BudgetExpenseParams {
            category,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_in_draft_with_derived_total() {
        let (user, stores, building_id) = setup().await;
        let budget = CreateBudgetService::new(&user, &stores)
            .call(annual_params(building_id))
            .await
            .unwrap();
        assert_eq!(budget.status, BudgetStatus::Draft);
        assert_eq!(budget.total_budget(), 50_000.0);
    }

    #[tokio::test]
    async fn test_create_for_missing_building_fails() {
        let (user, stores, _) = setup().await;
        let err = CreateBudgetService::new(&user, &stores)
            .call(annual_params(999))
            .await
            .unwrap_err();
        assert!(matches!(err, BlError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_allocation_edit_moves_derived_total() {
        let (user, stores, building_id) = setup().await;
        let budget = CreateBudgetService::new(&user, &stores)
            .call(annual_params(building_id))
            .await
            .unwrap();

        let mut allocations = budget.allocations.clone();
        allocations.capital_expenditure = 20_000.0;
        let budget = UpdateAllocationsService::new(&user, &stores)
            .call(budget.id.unwrap(), allocations)
            .await
            .unwrap();
        assert_eq!(budget.total_budget(), 58_000.0);
    }

    #[tokio::test]
    async fn test_overrun_flips_health_to_over_budget() {
        let (user, stores, building_id) = setup().await;
        let budget = CreateBudgetService::new(&user, &stores)
            .call(annual_params(building_id))
            .await
            .unwrap();
        let budget_id = budget.id.unwrap();
        let service = AddBudgetExpenseService::new(&user, &stores);

        service
            .call(budget_id, expense(BudgetCategory::CapitalExpenditure, 10_000.0))
            .await
            .unwrap();
        service
            .call(budget_id, expense(BudgetCategory::Utilities, 20_000.0))
            .await
            .unwrap();
        let summary = service
            .call(budget_id, expense(BudgetCategory::ReactiveMaintenance, 25_000.0))
            .await
            .unwrap();

        assert_eq!(summary.total_spent, 55_000.0);
        assert_eq!(summary.total_remaining, -5_000.0);
        assert_eq!(summary.utilization, 110.0);
        assert_eq!(summary.health, BudgetHealth::OverBudget);
        assert_eq!(summary.expense_count, 3);
    }

    #[tokio::test]
    async fn test_negative_expense_rejected_and_not_stored() {
        let (user, stores, building_id) = setup().await;
        let budget = CreateBudgetService::new(&user, &stores)
            .call(annual_params(building_id))
            .await
            .unwrap();
        let budget_id = budget.id.unwrap();

        let err = AddBudgetExpenseService::new(&user, &stores)
            .call(budget_id, expense(BudgetCategory::Other, -5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BlError::Validation(_)));
        assert!(stores.budgets.list_expenses(budget_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_change_is_journaled() {
        let (user, stores, building_id) = setup().await;
        let budget = CreateBudgetService::new(&user, &stores)
            .call(annual_params(building_id))
            .await
            .unwrap();
        let budget_id = budget.id.unwrap();
        let service = UpdateBudgetStatusService::new(&user, &stores);

        service.call(budget_id, BudgetStatus::Approved).await.unwrap();
        service.call(budget_id, BudgetStatus::Active).await.unwrap();
        // No-op change writes no entry.
        service.call(budget_id, BudgetStatus::Active).await.unwrap();

        let entries = stores
            .journals
            .list_for_entity(JournalKind::BuildingBudget, budget_id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].detail.as_deref(), Some("DRAFT -> APPROVED"));
        assert_eq!(entries[1].detail.as_deref(), Some("APPROVED -> ACTIVE"));
    }
}
