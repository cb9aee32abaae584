//! Milestone model and material line items
//!
//! A milestone is a budgeted work package within a project. Its cost
//! breakdown carries the *allocated* side of the ledger; the *actual* side is
//! always derived from weekly updates and never stored here.

use bl_core::error::ValidationErrors;
use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Milestone lifecycle status.
///
/// The transition graph is deliberately unrestricted; transitions into
/// [`MilestoneStatus::Completed`] or [`MilestoneStatus::Cancelled`] are
/// journaled for audit rather than forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    #[default]
    Planning,
    NotStarted,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLANNING" => Some(Self::Planning),
            "NOT_STARTED" => Some(Self::NotStarted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "ON_HOLD" => Some(Self::OnHold),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Any status is reachable from any status. Kept as an explicit
    /// validator so this permissive graph is never conflated with the strict
    /// payment-request one.
    pub fn validate_transition(_from: Self, _to: Self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Transitions into these states are recorded in the audit journal.
    pub fn requires_audit(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A material line item attached to a milestone
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub supplier: Option<String>,
    /// Opaque reference to an uploaded supplier quotation
    pub quotation_ref: Option<String>,
    pub quotation_amount: Option<f64>,
}

impl MaterialItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Milestone entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Option<Id>,
    pub project_id: Id,
    pub name: String,
    pub description: Option<String>,
    /// Assigned artisan, if any
    pub assignee_id: Option<Id>,
    pub status: MilestoneStatus,
    pub due_date: Option<NaiveDate>,

    // Allocated cost breakdown
    pub labour_cost: f64,
    /// Derived from `material_items` whenever any exist; free-standing
    /// otherwise.
    pub material_cost: f64,
    pub diesel_cost: f64,
    pub rent_cost: f64,
    pub admin_cost: f64,
    pub other_operational_cost: f64,
    pub budget_allocated: f64,
    /// Always `budget_allocated - cost_total()`; maintained by
    /// [`Milestone::recalculate`], never authoritative as stored.
    pub expected_profit: f64,

    pub material_items: Vec<MaterialItem>,
    /// Opaque references to uploaded supplier-quotation documents
    pub quotation_docs: Vec<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(project_id: Id, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sum of all allocated cost components.
    pub fn cost_total(&self) -> f64 {
        self.material_cost
            + self.labour_cost
            + self.diesel_cost
            + self.rent_cost
            + self.admin_cost
            + self.other_operational_cost
    }

    /// Re-derive `material_cost` (when line items exist) and
    /// `expected_profit` from the current cost fields.
    ///
    /// Every cost-field or material-item mutation must end with this call so
    /// no caller ever observes the breakdown and the profit disagreeing.
    pub fn recalculate(&mut self) {
        if !self.material_items.is_empty() {
            self.material_cost = self.material_items.iter().map(MaterialItem::total).sum();
        }
        self.expected_profit = self.budget_allocated - self.cost_total();
    }

    /// Whether `material_cost` is derived from line items rather than
    /// directly editable.
    pub fn material_cost_is_derived(&self) -> bool {
        !self.material_items.is_empty()
    }

    pub fn add_material_item(&mut self, item: MaterialItem) {
        self.material_items.push(item);
        self.recalculate();
    }

    /// Replace the item at `index`. Returns false if the index is out of
    /// range.
    pub fn update_material_item(&mut self, index: usize, item: MaterialItem) -> bool {
        match self.material_items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                self.recalculate();
                true
            }
            None => false,
        }
    }

    pub fn remove_material_item(&mut self, index: usize) -> Option<MaterialItem> {
        if index >= self.material_items.len() {
            return None;
        }
        let removed = self.material_items.remove(index);
        self.recalculate();
        Some(removed)
    }

    /// Overdue means past due and not in a terminal state.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && !self.status.is_terminal(),
            None => false,
        }
    }
}

impl Identifiable for Milestone {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Milestone {
    const TABLE_NAME: &'static str = "milestones";
    const TYPE_NAME: &'static str = "Milestone";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milestone_with_costs() -> Milestone {
        let mut m = Milestone::new(1, "Foundation");
        m.budget_allocated = 10_000.0;
        m.labour_cost = 3_000.0;
        m.material_cost = 2_000.0;
        m.recalculate();
        m
    }

    #[test]
    fn test_expected_profit_derivation() {
        let m = milestone_with_costs();
        assert_eq!(m.expected_profit, 5_000.0);
    }

    #[test]
    fn test_material_cost_derived_from_items() {
        let mut m = milestone_with_costs();
        m.add_material_item(MaterialItem {
            name: "Cement".into(),
            quantity: 100.0,
            unit_price: 12.5,
            ..Default::default()
        });
        m.add_material_item(MaterialItem {
            name: "Rebar".into(),
            quantity: 40.0,
            unit_price: 25.0,
            ..Default::default()
        });

        assert!(m.material_cost_is_derived());
        assert_eq!(m.material_cost, 1_250.0 + 1_000.0);
        assert_eq!(
            m.expected_profit,
            10_000.0 - (2_250.0 + 3_000.0)
        );
    }

    #[test]
    fn test_remove_last_item_keeps_last_derived_cost() {
        let mut m = Milestone::new(1, "Roofing");
        m.budget_allocated = 5_000.0;
        m.add_material_item(MaterialItem {
            name: "Sheets".into(),
            quantity: 10.0,
            unit_price: 50.0,
            ..Default::default()
        });
        assert_eq!(m.material_cost, 500.0);

        m.remove_material_item(0);
        // No items left: material_cost is free-standing again and retains
        // its last value; profit stays consistent with the breakdown.
        assert_eq!(m.expected_profit, m.budget_allocated - m.cost_total());
    }

    #[test]
    fn test_update_material_item_out_of_range() {
        let mut m = Milestone::new(1, "Walls");
        assert!(!m.update_material_item(0, MaterialItem::default()));
        assert!(m.remove_material_item(3).is_none());
    }

    #[test]
    fn test_status_transitions_unrestricted() {
        use MilestoneStatus::*;
        for from in [Planning, NotStarted, InProgress, OnHold, Completed, Cancelled] {
            for to in [Planning, NotStarted, InProgress, OnHold, Completed, Cancelled] {
                assert!(MilestoneStatus::validate_transition(from, to).is_ok());
            }
        }
        assert!(Completed.requires_audit());
        assert!(Cancelled.requires_audit());
        assert!(!InProgress.requires_audit());
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut m = Milestone::new(1, "Late one");
        m.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        m.status = MilestoneStatus::InProgress;
        assert!(m.is_overdue(today));

        m.status = MilestoneStatus::Completed;
        assert!(!m.is_overdue(today));

        m.due_date = None;
        m.status = MilestoneStatus::InProgress;
        assert!(!m.is_overdue(today));
    }
}
