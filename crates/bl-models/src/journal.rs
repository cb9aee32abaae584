//! Audit journal model
//!
//! Append-only records for the transitions the domain flags for audit:
//! milestones entering COMPLETED/CANCELLED, payment decisions, budget status
//! changes.

use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of entity a journal entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Milestone,
    PaymentRequest,
    BuildingBudget,
}

impl JournalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milestone => "Milestone",
            Self::PaymentRequest => "PaymentRequest",
            Self::BuildingBudget => "BuildingBudget",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Milestone" => Some(Self::Milestone),
            "PaymentRequest" => Some(Self::PaymentRequest),
            "BuildingBudget" => Some(Self::BuildingBudget),
            _ => None,
        }
    }
}

/// A single audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Option<Id>,
    pub kind: JournalKind,
    pub entity_id: Id,
    pub actor_id: Id,
    /// Short action tag, e.g. "status_changed", "approved", "rejected"
    pub action: String,
    pub detail: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    pub fn new(
        kind: JournalKind,
        entity_id: Id,
        actor_id: Id,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind,
            entity_id,
            actor_id,
            action: action.into(),
            detail: None,
            created_at: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Identifiable for JournalEntry {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for JournalEntry {
    const TABLE_NAME: &'static str = "journal_entries";
    const TYPE_NAME: &'static str = "JournalEntry";
}
