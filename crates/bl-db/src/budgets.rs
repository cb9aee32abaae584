//! Building budget and expense ledger store
//!
//! Allocations are one JSONB document; only the eight raw amounts are
//! stored, never their sum.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::budget::{
    BudgetCategory, BudgetExpense, BudgetStatus, BuildingBudget, CategoryAllocations,
};
use bl_store::ports::BudgetStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct BudgetRow {
    id: i64,
    building_id: i64,
    fiscal_year: i32,
    quarter: Option<i32>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    allocations: Json<CategoryAllocations>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl BudgetRow {
    fn into_model(self) -> BlResult<BuildingBudget> {
        let status = BudgetStatus::parse(&self.status)
            .ok_or_else(|| corrupt(BuildingBudget::TYPE_NAME, "status", &self.status))?;
        Ok(BuildingBudget {
            id: Some(self.id),
            building_id: self.building_id,
            fiscal_year: self.fiscal_year,
            quarter: self.quarter,
            period_start: self.period_start,
            period_end: self.period_end,
            allocations: self.allocations.0,
            status,
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    id: i64,
    budget_id: i64,
    category: String,
    amount: f64,
    date: NaiveDate,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn into_model(self) -> BlResult<BudgetExpense> {
        let category = BudgetCategory::parse(&self.category)
            .ok_or_else(|| corrupt(BudgetExpense::TYPE_NAME, "category", &self.category))?;
        Ok(BudgetExpense {
            id: Some(self.id),
            budget_id: self.budget_id,
            category,
            amount: self.amount,
            date: self.date,
            description: self.description,
            created_at: Some(self.created_at),
        })
    }
}

const BUDGET_COLUMNS: &str = "id, building_id, fiscal_year, quarter, period_start, period_end, \
     allocations, status, created_at, updated_at";

const EXPENSE_COLUMNS: &str = "id, budget_id, category, amount, date, description, created_at";

pub struct PgBudgetStore {
    pool: PgPool,
}

impl PgBudgetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BudgetStore for PgBudgetStore {
    async fn create(&self, budget: BuildingBudget) -> BlResult<BuildingBudget> {
        let row = sqlx::query_as::<_, BudgetRow>(&format!(
            r#"
            INSERT INTO building_budgets
                (building_id, fiscal_year, quarter, period_start, period_end,
                 allocations, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(budget.building_id)
        .bind(budget.fiscal_year)
        .bind(budget.quarter)
        .bind(budget.period_start)
        .bind(budget.period_end)
        .bind(Json(&budget.allocations))
        .bind(budget.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_model()
    }

    async fn find(&self, id: Id) -> BlResult<BuildingBudget> {
        sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM building_budgets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(BuildingBudget::TYPE_NAME, id))?
        .into_model()
    }

    async fn list(&self) -> BlResult<Vec<BuildingBudget>> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM building_budgets ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(BudgetRow::into_model).collect()
    }

    async fn list_for_building(&self, building_id: Id) -> BlResult<Vec<BuildingBudget>> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM building_budgets WHERE building_id = $1 ORDER BY id"
        ))
        .bind(building_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(BudgetRow::into_model).collect()
    }

    async fn update(&self, budget: BuildingBudget) -> BlResult<BuildingBudget> {
        let id = budget
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted BuildingBudget".into()))?;
        sqlx::query_as::<_, BudgetRow>(&format!(
            r#"
            UPDATE building_budgets SET
                fiscal_year = $2, quarter = $3, period_start = $4, period_end = $5,
                allocations = $6, status = $7, updated_at = now()
            WHERE id = $1
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(budget.fiscal_year)
        .bind(budget.quarter)
        .bind(budget.period_start)
        .bind(budget.period_end)
        .bind(Json(&budget.allocations))
        .bind(budget.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(BuildingBudget::TYPE_NAME, id))?
        .into_model()
    }

    async fn add_expense(&self, expense: BudgetExpense) -> BlResult<BudgetExpense> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            INSERT INTO budget_expenses (budget_id, category, amount, date, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(expense.budget_id)
        .bind(expense.category.as_str())
        .bind(expense.amount)
        .bind(expense.date)
        .bind(&expense.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_model()
    }

    async fn list_expenses(&self, budget_id: Id) -> BlResult<Vec<BudgetExpense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM budget_expenses WHERE budget_id = $1 ORDER BY id"
        ))
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(ExpenseRow::into_model).collect()
    }
}
