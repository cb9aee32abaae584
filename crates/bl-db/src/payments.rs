//! Payment request store
//!
//! `decide` is a conditional UPDATE keyed on `status = 'PENDING'`: the
//! winner of a race flips the row, the loser matches nothing and gets
//! `InvalidState` built from the row's current state.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::{FromRow, PgPool};

use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::payment_request::{PaymentDecision, PaymentRequest, PaymentStatus};
use bl_store::ports::PaymentStore;

use crate::{corrupt, db_err};

#[derive(Debug, FromRow)]
struct PaymentRequestRow {
    id: i64,
    milestone_id: i64,
    contractor_id: i64,
    request_number: String,
    calculated_amount: f64,
    status: String,
    rejection_reason: Option<String>,
    reviewer_notes: Option<String>,
    reviewed_by: Option<i64>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PaymentRequestRow {
    fn into_model(self) -> BlResult<PaymentRequest> {
        let status = PaymentStatus::parse(&self.status)
            .ok_or_else(|| corrupt(PaymentRequest::TYPE_NAME, "status", &self.status))?;
        Ok(PaymentRequest {
            id: Some(self.id),
            milestone_id: self.milestone_id,
            contractor_id: self.contractor_id,
            request_number: self.request_number,
            calculated_amount: self.calculated_amount,
            status,
            rejection_reason: self.rejection_reason,
            reviewer_notes: self.reviewer_notes,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            created_at: Some(self.created_at),
        })
    }
}

const COLUMNS: &str = "id, milestone_id, contractor_id, request_number, calculated_amount, \
     status, rejection_reason, reviewer_notes, reviewed_by, reviewed_at, created_at";

pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn create(&self, request: PaymentRequest) -> BlResult<PaymentRequest> {
        let seq = sqlx::query_scalar::<_, i64>("SELECT nextval('payment_request_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let request_number = PaymentRequest::format_request_number(Utc::now().year(), seq);

        let row = sqlx::query_as::<_, PaymentRequestRow>(&format!(
            r#"
            INSERT INTO payment_requests
                (milestone_id, contractor_id, request_number, calculated_amount, status)
            VALUES ($1, $2, $3, $4, 'PENDING')
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.milestone_id)
        .bind(request.contractor_id)
        .bind(&request_number)
        .bind(request.calculated_amount)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.into_model()
    }

    async fn find(&self, id: Id) -> BlResult<PaymentRequest> {
        sqlx::query_as::<_, PaymentRequestRow>(&format!(
            "SELECT {COLUMNS} FROM payment_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| BlError::not_found(PaymentRequest::TYPE_NAME, id))?
        .into_model()
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<PaymentRequest>> {
        let rows = sqlx::query_as::<_, PaymentRequestRow>(&format!(
            "SELECT {COLUMNS} FROM payment_requests WHERE milestone_id = $1 ORDER BY id"
        ))
        .bind(milestone_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(PaymentRequestRow::into_model).collect()
    }

    async fn decide(
        &self,
        id: Id,
        decision: PaymentDecision,
        rejection_reason: Option<String>,
        reviewer_notes: Option<String>,
        reviewer_id: Id,
    ) -> BlResult<PaymentRequest> {
        let decided = sqlx::query_as::<_, PaymentRequestRow>(&format!(
            r#"
            UPDATE payment_requests SET
                status = $2, rejection_reason = $3, reviewer_notes = $4,
                reviewed_by = $5, reviewed_at = now()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(decision.to_status().as_str())
        .bind(&rejection_reason)
        .bind(&reviewer_notes)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match decided {
            Some(row) => row.into_model(),
            None => {
                // Either the row is missing or it is already decided.
                let current = self.find(id).await?;
                Err(BlError::invalid_state(
                    PaymentRequest::TYPE_NAME,
                    current.status.as_str(),
                    format!("transition to {}", decision.to_status().as_str()),
                ))
            }
        }
    }
}
