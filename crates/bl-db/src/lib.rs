//! # bl-db
//!
//! PostgreSQL implementations of the `bl-store` ports: one module per
//! table, runtime `query_as` over explicit row structs. Statuses travel as
//! their text form; embedded collections as JSONB. The two atomicity
//! contracts become SQL: payment decisions are a conditional UPDATE keyed on
//! `status = 'PENDING'`, milestone mutations run inside one transaction
//! under `SELECT ... FOR UPDATE`.

pub mod pool;

pub mod budgets;
pub mod buildings;
pub mod incomes;
pub mod journals;
pub mod milestones;
pub mod payments;
pub mod projects;
pub mod risks;
pub mod weekly_updates;

use std::sync::Arc;

use sqlx::PgPool;

use bl_core::BlError;
use bl_store::Stores;

pub use pool::Database;

/// Wire every port to its Postgres implementation over one shared pool.
pub fn pg_stores(pool: PgPool) -> Stores {
    Stores {
        projects: Arc::new(projects::PgProjectStore::new(pool.clone())),
        milestones: Arc::new(milestones::PgMilestoneStore::new(pool.clone())),
        weekly_updates: Arc::new(weekly_updates::PgWeeklyUpdateStore::new(pool.clone())),
        risks: Arc::new(risks::PgRiskStore::new(pool.clone())),
        payments: Arc::new(payments::PgPaymentStore::new(pool.clone())),
        buildings: Arc::new(buildings::PgBuildingStore::new(pool.clone())),
        budgets: Arc::new(budgets::PgBudgetStore::new(pool.clone())),
        incomes: Arc::new(incomes::PgIncomeStore::new(pool.clone())),
        journals: Arc::new(journals::PgJournalStore::new(pool)),
    }
}

pub(crate) fn db_err(err: sqlx::Error) -> BlError {
    BlError::Database(err.to_string())
}

/// A stored enum text that no longer parses. Only possible through manual
/// data edits; surfaced as an internal error, never a validation one.
pub(crate) fn corrupt(entity: &'static str, column: &'static str, value: &str) -> BlError {
    BlError::Internal(format!(
        "corrupt {} row: {} = {:?} does not parse",
        entity, column, value
    ))
}
