//! Weekly update model and itemized expenses
//!
//! A weekly update is the unit of actual-expenditure reporting against a
//! milestone. Category totals (labour/material/other) carry the week's
//! spend; itemized expenses are line-level detail on top of them and are
//! never summed into the total.

use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A quoted-vs-actual cost line within a weekly update
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemizedExpense {
    pub description: String,
    pub quoted_amount: f64,
    pub actual_spent: f64,
    /// Opaque reference to an uploaded invoice
    pub invoice_ref: Option<String>,
    /// Required whenever `actual_spent > quoted_amount`
    pub reason_for_overspend: Option<String>,
}

impl ItemizedExpense {
    pub fn new(description: impl Into<String>, quoted_amount: f64, actual_spent: f64) -> Self {
        Self {
            description: description.into(),
            quoted_amount,
            actual_spent,
            ..Default::default()
        }
    }

    pub fn is_overspent(&self) -> bool {
        self.actual_spent > self.quoted_amount
    }

    /// An overspent line with no justification cannot be committed.
    pub fn needs_justification(&self) -> bool {
        self.is_overspent()
            && self
                .reason_for_overspend
                .as_deref()
                .map(|r| r.trim().is_empty())
                .unwrap_or(true)
    }

    /// Discard a stale justification once the line is back within quote.
    ///
    /// Called after every mutation of `quoted_amount` or `actual_spent`.
    pub fn normalize(&mut self) {
        if !self.is_overspent() {
            self.reason_for_overspend = None;
        }
    }
}

/// Weekly update entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyUpdate {
    pub id: Option<Id>,
    pub milestone_id: Id,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,

    pub labour_expenditure: f64,
    pub material_expenditure: f64,
    pub other_expenditure: f64,
    /// 0..=100; a later week may legitimately report a lower value
    pub progress_percentage: f64,

    pub work_done: Option<String>,
    pub challenges: Option<String>,
    pub successes: Option<String>,
    pub next_week_plan: Option<String>,
    pub notes: Option<String>,

    /// Opaque photo URLs; minimum-count policy belongs to the UI
    pub photos: Vec<String>,
    pub items: Vec<ItemizedExpense>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WeeklyUpdate {
    pub fn new(milestone_id: Id, week_start_date: NaiveDate, week_end_date: NaiveDate) -> Self {
        Self {
            milestone_id,
            week_start_date,
            week_end_date,
            ..Default::default()
        }
    }

    /// The week's total spend. Derived on every call; itemized lines are
    /// informational and excluded by design.
    pub fn total_expenditure(&self) -> f64 {
        self.labour_expenditure + self.material_expenditure + self.other_expenditure
    }

    pub fn add_item(&mut self, mut item: ItemizedExpense) {
        item.normalize();
        self.items.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> Option<ItemizedExpense> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.remove(index))
    }

    /// Replace the line at `index`, re-running overspend normalization.
    pub fn update_item(&mut self, index: usize, mut item: ItemizedExpense) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                item.normalize();
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Indices of lines that are overspent without a justification.
    pub fn unjustified_items(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.needs_justification())
            .map(|(i, _)| i)
            .collect()
    }
}

impl Identifiable for WeeklyUpdate {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for WeeklyUpdate {
    const TABLE_NAME: &'static str = "weekly_updates";
    const TYPE_NAME: &'static str = "WeeklyUpdate";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
        )
    }

    #[test]
    fn test_total_expenditure_excludes_items() {
        let (start, end) = week();
        let mut update = WeeklyUpdate::new(1, start, end);
        update.labour_expenditure = 1_000.0;
        update.material_expenditure = 400.0;
        update.other_expenditure = 100.0;
        update.add_item(ItemizedExpense::new("Gravel", 300.0, 250.0));

        assert_eq!(update.total_expenditure(), 1_500.0);
    }

    #[test]
    fn test_overspend_needs_justification() {
        let mut item = ItemizedExpense::new("Timber", 500.0, 620.0);
        assert!(item.needs_justification());

        item.reason_for_overspend = Some("   ".into());
        assert!(item.needs_justification());

        item.reason_for_overspend = Some("supplier price increase".into());
        assert!(!item.needs_justification());
    }

    #[test]
    fn test_normalize_clears_stale_reason() {
        let mut item = ItemizedExpense::new("Paint", 200.0, 260.0);
        item.reason_for_overspend = Some("extra coats required".into());

        item.actual_spent = 180.0;
        item.normalize();
        assert_eq!(item.reason_for_overspend, None);
    }

    #[test]
    fn test_exact_quote_is_not_overspend() {
        let item = ItemizedExpense::new("Sand", 100.0, 100.0);
        assert!(!item.is_overspent());
        assert!(!item.needs_justification());
    }

    #[test]
    fn test_unjustified_items_indices() {
        let (start, end) = week();
        let mut update = WeeklyUpdate::new(1, start, end);
        update.add_item(ItemizedExpense::new("Within quote", 100.0, 90.0));
        update.add_item(ItemizedExpense::new("Over, no reason", 100.0, 150.0));
        let mut justified = ItemizedExpense::new("Over, justified", 100.0, 150.0);
        justified.reason_for_overspend = Some("rush delivery".into());
        update.add_item(justified);

        assert_eq!(update.unjustified_items(), vec![1]);
    }

    #[test]
    fn test_update_item_renormalizes() {
        let (start, end) = week();
        let mut update = WeeklyUpdate::new(1, start, end);
        let mut item = ItemizedExpense::new("Blocks", 100.0, 150.0);
        item.reason_for_overspend = Some("breakage".into());
        update.add_item(item);

        let mut edited = update.items[0].clone();
        edited.actual_spent = 80.0;
        assert!(update.update_item(0, edited));
        assert_eq!(update.items[0].reason_for_overspend, None);
    }
}
