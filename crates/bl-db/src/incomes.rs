//! Income and charge store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::Entity;
use bl_models::income::{BuildingCharge, ChargeKind, IncomeKind, IncomeRecord};
use bl_store::ports::IncomeStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct IncomeRow {
    id: i64,
    building_id: i64,
    kind: String,
    amount: f64,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl IncomeRow {
    fn into_income(self) -> BlResult<IncomeRecord> {
        let kind = IncomeKind::parse(&self.kind)
            .ok_or_else(|| corrupt(IncomeRecord::TYPE_NAME, "kind", &self.kind))?;
        Ok(IncomeRecord {
            id: Some(self.id),
            building_id: self.building_id,
            kind,
            amount: self.amount,
            date: self.date,
            created_at: Some(self.created_at),
        })
    }

    fn into_charge(self) -> BlResult<BuildingCharge> {
        let kind = ChargeKind::parse(&self.kind)
            .ok_or_else(|| corrupt(BuildingCharge::TYPE_NAME, "kind", &self.kind))?;
        Ok(BuildingCharge {
            id: Some(self.id),
            building_id: self.building_id,
            kind,
            amount: self.amount,
            date: self.date,
            created_at: Some(self.created_at),
        })
    }
}

pub struct PgIncomeStore {
    pool: PgPool,
}

impl PgIncomeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncomeStore for PgIncomeStore {
    async fn add_income(&self, income: IncomeRecord) -> BlResult<IncomeRecord> {
        sqlx::query_as::<_, IncomeRow>(
            r#"
            INSERT INTO income_records (building_id, kind, amount, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, building_id, kind, amount, date, created_at
            "#,
        )
        .bind(income.building_id)
        .bind(income.kind.as_str())
        .bind(income.amount)
        .bind(income.date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .into_income()
    }

    async fn add_charge(&self, charge: BuildingCharge) -> BlResult<BuildingCharge> {
        sqlx::query_as::<_, IncomeRow>(
            r#"
            INSERT INTO building_charges (building_id, kind, amount, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, building_id, kind, amount, date, created_at
            "#,
        )
        .bind(charge.building_id)
        .bind(charge.kind.as_str())
        .bind(charge.amount)
        .bind(charge.date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .into_charge()
    }

    async fn list_incomes(&self) -> BlResult<Vec<IncomeRecord>> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, building_id, kind, amount, date, created_at \
             FROM income_records ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(IncomeRow::into_income).collect()
    }

    async fn list_charges(&self) -> BlResult<Vec<BuildingCharge>> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, building_id, kind, amount, date, created_at \
             FROM building_charges ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(IncomeRow::into_charge).collect()
    }
}
