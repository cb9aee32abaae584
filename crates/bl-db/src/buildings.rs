//! Building store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::building::Building;
use bl_store::ports::BuildingStore;

use crate::db_err;

#[derive(Debug, FromRow)]
struct BuildingRow {
    id: i64,
    name: String,
    address: Option<String>,
    total_units: i32,
    occupied_units: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Self {
        Building {
            id: Some(row.id),
            name: row.name,
            address: row.address,
            total_units: row.total_units,
            occupied_units: row.occupied_units,
            created_at: Some(row.created_at),
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, address, total_units, occupied_units, created_at, updated_at";

pub struct PgBuildingStore {
    pool: PgPool,
}

impl PgBuildingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildingStore for PgBuildingStore {
    async fn create(&self, building: Building) -> BlResult<Building> {
        let row = sqlx::query_as::<_, BuildingRow>(&format!(
            r#"
            INSERT INTO buildings (name, address, total_units, occupied_units)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&building.name)
        .bind(&building.address)
        .bind(building.total_units)
        .bind(building.occupied_units)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn find(&self, id: Id) -> BlResult<Building> {
        let row = sqlx::query_as::<_, BuildingRow>(&format!(
            "SELECT {COLUMNS} FROM buildings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(Building::TYPE_NAME, id))?;
        Ok(row.into())
    }

    async fn list(&self) -> BlResult<Vec<Building>> {
        let rows =
            sqlx::query_as::<_, BuildingRow>(&format!("SELECT {COLUMNS} FROM buildings ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(Building::from).collect())
    }
}
