//! Project store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::pagination::{PaginatedResult, Pagination};
use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::project::Project;
use bl_store::ports::ProjectStore;

use crate::db_err;

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    description: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: Some(row.id),
            name: row.name,
            description: row.description,
            active: row.active,
            created_at: Some(row.created_at),
            updated_at: row.updated_at,
        }
    }
}

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create(&self, project: Project) -> BlResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, active)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.active)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn find(&self, id: Id) -> BlResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, active, created_at, updated_at \
             FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(Project::TYPE_NAME, id))?;
        Ok(row.into())
    }

    async fn list(&self, pagination: Pagination) -> BlResult<PaginatedResult<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, active, created_at, updated_at \
             FROM projects ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            rows.into_iter().map(Project::from).collect(),
            total,
            pagination,
        ))
    }
}
