//! Risk store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::risk::{Risk, RiskCategory, RiskLevel, RiskStatus};
use bl_store::ports::RiskStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct RiskRow {
    id: i64,
    milestone_id: i64,
    description: String,
    category: String,
    probability: String,
    impact: String,
    mitigation_strategy: Option<String>,
    status: String,
    created_by: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl RiskRow {
    fn into_model(self) -> BlResult<Risk> {
        Ok(Risk {
            id: Some(self.id),
            milestone_id: self.milestone_id,
            description: self.description,
            category: RiskCategory::parse(&self.category)
                .ok_or_else(|| corrupt(Risk::TYPE_NAME, "category", &self.category))?,
            probability: RiskLevel::parse(&self.probability)
                .ok_or_else(|| corrupt(Risk::TYPE_NAME, "probability", &self.probability))?,
            impact: RiskLevel::parse(&self.impact)
                .ok_or_else(|| corrupt(Risk::TYPE_NAME, "impact", &self.impact))?,
            mitigation_strategy: self.mitigation_strategy,
            status: RiskStatus::parse(&self.status)
                .ok_or_else(|| corrupt(Risk::TYPE_NAME, "status", &self.status))?,
            created_by: self.created_by,
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        })
    }
}

const COLUMNS: &str = "id, milestone_id, description, category, probability, impact, \
     mitigation_strategy, status, created_by, created_at, updated_at";

pub struct PgRiskStore {
    pool: PgPool,
}

impl PgRiskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RiskStore for PgRiskStore {
    async fn create(&self, risk: Risk) -> BlResult<Risk> {
        let row = sqlx::query_as::<_, RiskRow>(&format!(
            r#"
            INSERT INTO risks
                (milestone_id, description, category, probability, impact,
                 mitigation_strategy, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(risk.milestone_id)
        .bind(&risk.description)
        .bind(risk.category.as_str())
        .bind(risk.probability.as_str())
        .bind(risk.impact.as_str())
        .bind(&risk.mitigation_strategy)
        .bind(risk.status.as_str())
        .bind(risk.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_model()
    }

    async fn find(&self, id: Id) -> BlResult<Risk> {
        sqlx::query_as::<_, RiskRow>(&format!("SELECT {COLUMNS} FROM risks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| BlError::not_found(Risk::TYPE_NAME, id))?
            .into_model()
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<Risk>> {
        let rows = sqlx::query_as::<_, RiskRow>(&format!(
            "SELECT {COLUMNS} FROM risks WHERE milestone_id = $1 ORDER BY id"
        ))
        .bind(milestone_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(RiskRow::into_model).collect()
    }

    async fn update(&self, risk: Risk) -> BlResult<Risk> {
        let id = risk
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted Risk".into()))?;
        sqlx::query_as::<_, RiskRow>(&format!(
            r#"
            UPDATE risks SET
                description = $2, category = $3, probability = $4, impact = $5,
                mitigation_strategy = $6, status = $7, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&risk.description)
        .bind(risk.category.as_str())
        .bind(risk.probability.as_str())
        .bind(risk.impact.as_str())
        .bind(&risk.mitigation_strategy)
        .bind(risk.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(Risk::TYPE_NAME, id))?
        .into_model()
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        let result = sqlx::query("DELETE FROM risks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(BlError::not_found(Risk::TYPE_NAME, id));
        }
        Ok(())
    }
}
