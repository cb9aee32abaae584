//! Audit journal store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_models::journal::{JournalEntry, JournalKind};
use bl_store::ports::JournalStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct JournalRow {
    id: i64,
    kind: String,
    entity_id: i64,
    actor_id: i64,
    action: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl JournalRow {
    fn into_model(self) -> BlResult<JournalEntry> {
        let kind = JournalKind::parse(&self.kind)
            .ok_or_else(|| corrupt(JournalEntry::TYPE_NAME, "kind", &self.kind))?;
        Ok(JournalEntry {
            id: Some(self.id),
            kind,
            entity_id: self.entity_id,
            actor_id: self.actor_id,
            action: self.action,
            detail: self.detail,
            created_at: Some(self.created_at),
        })
    }
}

pub struct PgJournalStore {
    pool: PgPool,
}

impl PgJournalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JournalStore for PgJournalStore {
    async fn append(&self, entry: JournalEntry) -> BlResult<JournalEntry> {
        sqlx::query_as::<_, JournalRow>(
            r#"
            INSERT INTO journal_entries (kind, entity_id, actor_id, action, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, entity_id, actor_id, action, detail, created_at
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.entity_id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.detail)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .into_model()
    }

    async fn list_for_entity(
        &self,
        kind: JournalKind,
        entity_id: Id,
    ) -> BlResult<Vec<JournalEntry>> {
        let rows = sqlx::query_as::<_, JournalRow>(
            "SELECT id, kind, entity_id, actor_id, action, detail, created_at \
             FROM journal_entries WHERE kind = $1 AND entity_id = $2 ORDER BY id",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(JournalRow::into_model).collect()
    }
}
