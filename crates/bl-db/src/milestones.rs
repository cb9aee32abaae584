//! Milestone store
//!
//! Material items and quotation docs are JSONB columns on the milestone
//! row, so [`PgMilestoneStore::mutate`] can hold the whole aggregate under
//! one `SELECT ... FOR UPDATE` and write item edits and the recomputed
//! costs back together.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::milestone::{MaterialItem, Milestone, MilestoneStatus};
use bl_store::ports::MilestoneStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct MilestoneRow {
    id: i64,
    project_id: i64,
    name: String,
    description: Option<String>,
    assignee_id: Option<i64>,
    status: String,
    due_date: Option<NaiveDate>,
    labour_cost: f64,
    material_cost: f64,
    diesel_cost: f64,
    rent_cost: f64,
    admin_cost: f64,
    other_operational_cost: f64,
    budget_allocated: f64,
    expected_profit: f64,
    material_items: Json<Vec<MaterialItem>>,
    quotation_docs: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl MilestoneRow {
    fn into_model(self) -> BlResult<Milestone> {
        let status = MilestoneStatus::parse(&self.status)
            .ok_or_else(|| corrupt(Milestone::TYPE_NAME, "status", &self.status))?;
        Ok(Milestone {
            id: Some(self.id),
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            assignee_id: self.assignee_id,
            status,
            due_date: self.due_date,
            labour_cost: self.labour_cost,
            material_cost: self.material_cost,
            diesel_cost: self.diesel_cost,
            rent_cost: self.rent_cost,
            admin_cost: self.admin_cost,
            other_operational_cost: self.other_operational_cost,
            budget_allocated: self.budget_allocated,
            expected_profit: self.expected_profit,
            material_items: self.material_items.0,
            quotation_docs: self.quotation_docs.0,
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        })
    }
}

const COLUMNS: &str = "id, project_id, name, description, assignee_id, status, due_date, \
     labour_cost, material_cost, diesel_cost, rent_cost, admin_cost, \
     other_operational_cost, budget_allocated, expected_profit, \
     material_items, quotation_docs, created_at, updated_at";

pub struct PgMilestoneStore {
    pool: PgPool,
}

impl PgMilestoneStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_fields(
        tx: &mut Transaction<'_, Postgres>,
        milestone: &Milestone,
        id: Id,
    ) -> BlResult<MilestoneRow> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            r#"
            UPDATE milestones SET
                name = $2, description = $3, assignee_id = $4, status = $5,
                due_date = $6, labour_cost = $7, material_cost = $8,
                diesel_cost = $9, rent_cost = $10, admin_cost = $11,
                other_operational_cost = $12, budget_allocated = $13,
                expected_profit = $14, material_items = $15,
                quotation_docs = $16, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&milestone.name)
        .bind(&milestone.description)
        .bind(milestone.assignee_id)
        .bind(milestone.status.as_str())
        .bind(milestone.due_date)
        .bind(milestone.labour_cost)
        .bind(milestone.material_cost)
        .bind(milestone.diesel_cost)
        .bind(milestone.rent_cost)
        .bind(milestone.admin_cost)
        .bind(milestone.other_operational_cost)
        .bind(milestone.budget_allocated)
        .bind(milestone.expected_profit)
        .bind(Json(&milestone.material_items))
        .bind(Json(&milestone.quotation_docs))
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl MilestoneStore for PgMilestoneStore {
    async fn create(&self, milestone: Milestone) -> BlResult<Milestone> {
        let row = sqlx::query_as::<_, MilestoneRow>(&format!(
            r#"
            INSERT INTO milestones
                (project_id, name, description, assignee_id, status, due_date,
                 labour_cost, material_cost, diesel_cost, rent_cost, admin_cost,
                 other_operational_cost, budget_allocated, expected_profit,
                 material_items, quotation_docs)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(milestone.project_id)
        .bind(&milestone.name)
        .bind(&milestone.description)
        .bind(milestone.assignee_id)
        .bind(milestone.status.as_str())
        .bind(milestone.due_date)
        .bind(milestone.labour_cost)
        .bind(milestone.material_cost)
        .bind(milestone.diesel_cost)
        .bind(milestone.rent_cost)
        .bind(milestone.admin_cost)
        .bind(milestone.other_operational_cost)
        .bind(milestone.budget_allocated)
        .bind(milestone.expected_profit)
        .bind(Json(&milestone.material_items))
        .bind(Json(&milestone.quotation_docs))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_model()
    }

    async fn find(&self, id: Id) -> BlResult<Milestone> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "SELECT {COLUMNS} FROM milestones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(Milestone::TYPE_NAME, id))?
        .into_model()
    }

    async fn list_for_project(&self, project_id: Id) -> BlResult<Vec<Milestone>> {
        let rows = sqlx::query_as::<_, MilestoneRow>(&format!(
            "SELECT {COLUMNS} FROM milestones WHERE project_id = $1 ORDER BY id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(MilestoneRow::into_model).collect()
    }

    async fn update(&self, milestone: Milestone) -> BlResult<Milestone> {
        let id = milestone
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted Milestone".into()))?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM milestones WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(BlError::not_found(Milestone::TYPE_NAME, id));
        }

        let row = Self::write_fields(&mut tx, &milestone, id).await?;
        tx.commit().await.map_err(db_err)?;
        row.into_model()
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        // Children go with the parent via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(BlError::not_found(Milestone::TYPE_NAME, id));
        }
        Ok(())
    }

    async fn mutate(
        &self,
        id: Id,
        f: Box<dyn for<'a> FnOnce(&'a mut Milestone) -> BlResult<()> + Send>,
    ) -> BlResult<Milestone> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, MilestoneRow>(&format!(
            "SELECT {COLUMNS} FROM milestones WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(Milestone::TYPE_NAME, id))?;

        let mut milestone = row.into_model()?;
        // A failing closure rolls the transaction back on drop.
        f(&mut milestone)?;

        let row = Self::write_fields(&mut tx, &milestone, id).await?;
        tx.commit().await.map_err(db_err)?;
        row.into_model()
    }
}
