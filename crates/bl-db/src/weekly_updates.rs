//! Weekly update store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::weekly_update::{ItemizedExpense, WeeklyUpdate};
use bl_store::ports::WeeklyUpdateStore;

use crate::db_err;

#[derive(Debug, FromRow)]
struct WeeklyUpdateRow {
    id: i64,
    milestone_id: i64,
    week_start_date: NaiveDate,
    week_end_date: NaiveDate,
    labour_expenditure: f64,
    material_expenditure: f64,
    other_expenditure: f64,
    progress_percentage: f64,
    work_done: Option<String>,
    challenges: Option<String>,
    successes: Option<String>,
    next_week_plan: Option<String>,
    notes: Option<String>,
    photos: Json<Vec<String>>,
    items: Json<Vec<ItemizedExpense>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<WeeklyUpdateRow> for WeeklyUpdate {
    fn from(row: WeeklyUpdateRow) -> Self {
        WeeklyUpdate {
            id: Some(row.id),
            milestone_id: row.milestone_id,
            week_start_date: row.week_start_date,
            week_end_date: row.week_end_date,
            labour_expenditure: row.labour_expenditure,
            material_expenditure: row.material_expenditure,
            other_expenditure: row.other_expenditure,
            progress_percentage: row.progress_percentage,
            work_done: row.work_done,
            challenges: row.challenges,
            successes: row.successes,
            next_week_plan: row.next_week_plan,
            notes: row.notes,
            photos: row.photos.0,
            items: row.items.0,
            created_at: Some(row.created_at),
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, milestone_id, week_start_date, week_end_date, labour_expenditure, \
     material_expenditure, other_expenditure, progress_percentage, work_done, \
     challenges, successes, next_week_plan, notes, photos, items, \
     created_at, updated_at";

pub struct PgWeeklyUpdateStore {
    pool: PgPool,
}

impl PgWeeklyUpdateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeeklyUpdateStore for PgWeeklyUpdateStore {
    async fn create(&self, update: WeeklyUpdate) -> BlResult<WeeklyUpdate> {
        let row = sqlx::query_as::<_, WeeklyUpdateRow>(&format!(
            r#"
            INSERT INTO weekly_updates
                (milestone_id, week_start_date, week_end_date, labour_expenditure,
                 material_expenditure, other_expenditure, progress_percentage,
                 work_done, challenges, successes, next_week_plan, notes,
                 photos, items)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(update.milestone_id)
        .bind(update.week_start_date)
        .bind(update.week_end_date)
        .bind(update.labour_expenditure)
        .bind(update.material_expenditure)
        .bind(update.other_expenditure)
        .bind(update.progress_percentage)
        .bind(&update.work_done)
        .bind(&update.challenges)
        .bind(&update.successes)
        .bind(&update.next_week_plan)
        .bind(&update.notes)
        .bind(Json(&update.photos))
        .bind(Json(&update.items))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn find(&self, id: Id) -> BlResult<WeeklyUpdate> {
        let row = sqlx::query_as::<_, WeeklyUpdateRow>(&format!(
            "SELECT {COLUMNS} FROM weekly_updates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(WeeklyUpdate::TYPE_NAME, id))?;
        Ok(row.into())
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<WeeklyUpdate>> {
        let rows = sqlx::query_as::<_, WeeklyUpdateRow>(&format!(
            "SELECT {COLUMNS} FROM weekly_updates WHERE milestone_id = $1 ORDER BY id"
        ))
        .bind(milestone_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(WeeklyUpdate::from).collect())
    }

    async fn update(&self, update: WeeklyUpdate) -> BlResult<WeeklyUpdate> {
        let id = update
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted WeeklyUpdate".into()))?;
        let row = sqlx::query_as::<_, WeeklyUpdateRow>(&format!(
            r#"
            UPDATE weekly_updates SET
                week_start_date = $2, week_end_date = $3, labour_expenditure = $4,
                material_expenditure = $5, other_expenditure = $6,
                progress_percentage = $7, work_done = $8, challenges = $9,
                successes = $10, next_week_plan = $11, notes = $12,
                photos = $13, items = $14, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.week_start_date)
        .bind(update.week_end_date)
        .bind(update.labour_expenditure)
        .bind(update.material_expenditure)
        .bind(update.other_expenditure)
        .bind(update.progress_percentage)
        .bind(&update.work_done)
        .bind(&update.challenges)
        .bind(&update.successes)
        .bind(&update.next_week_plan)
        .bind(&update.notes)
        .bind(Json(&update.photos))
        .bind(Json(&update.items))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(WeeklyUpdate::TYPE_NAME, id))?;
        Ok(row.into())
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        let result = sqlx::query("DELETE FROM weekly_updates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(BlError::not_found(WeeklyUpdate::TYPE_NAME, id));
        }
        Ok(())
    }
}
