//! Building budget model and its expense ledger
//!
//! A budget covers one building for one fiscal period, split across eight
//! fixed categories. Its total is the derived sum of the allocations;
//! spend against it is a child ledger, summed at read time (`bl-reports`).

use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The eight fixed budget categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetCategory {
    PreventativeMaintenance,
    ReactiveMaintenance,
    CorrectiveMaintenance,
    CapitalExpenditure,
    Utilities,
    Insurance,
    PropertyTax,
    Other,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 8] = [
        Self::PreventativeMaintenance,
        Self::ReactiveMaintenance,
        Self::CorrectiveMaintenance,
        Self::CapitalExpenditure,
        Self::Utilities,
        Self::Insurance,
        Self::PropertyTax,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreventativeMaintenance => "PREVENTATIVE_MAINTENANCE",
            Self::ReactiveMaintenance => "REACTIVE_MAINTENANCE",
            Self::CorrectiveMaintenance => "CORRECTIVE_MAINTENANCE",
            Self::CapitalExpenditure => "CAPITAL_EXPENDITURE",
            Self::Utilities => "UTILITIES",
            Self::Insurance => "INSURANCE",
            Self::PropertyTax => "PROPERTY_TAX",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PREVENTATIVE_MAINTENANCE" => Some(Self::PreventativeMaintenance),
            "REACTIVE_MAINTENANCE" => Some(Self::ReactiveMaintenance),
            "CORRECTIVE_MAINTENANCE" => Some(Self::CorrectiveMaintenance),
            "CAPITAL_EXPENDITURE" => Some(Self::CapitalExpenditure),
            "UTILITIES" => Some(Self::Utilities),
            "INSURANCE" => Some(Self::Insurance),
            "PROPERTY_TAX" => Some(Self::PropertyTax),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Per-category allocation amounts
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocations {
    pub preventative_maintenance: f64,
    pub reactive_maintenance: f64,
    pub corrective_maintenance: f64,
    pub capital_expenditure: f64,
    pub utilities: f64,
    pub insurance: f64,
    pub property_tax: f64,
    pub other: f64,
}

impl CategoryAllocations {
    pub fn total(&self) -> f64 {
        self.preventative_maintenance
            + self.reactive_maintenance
            + self.corrective_maintenance
            + self.capital_expenditure
            + self.utilities
            + self.insurance
            + self.property_tax
            + self.other
    }

    pub fn amount_for(&self, category: BudgetCategory) -> f64 {
        match category {
            BudgetCategory::PreventativeMaintenance => self.preventative_maintenance,
            BudgetCategory::ReactiveMaintenance => self.reactive_maintenance,
            BudgetCategory::CorrectiveMaintenance => self.corrective_maintenance,
            BudgetCategory::CapitalExpenditure => self.capital_expenditure,
            BudgetCategory::Utilities => self.utilities,
            BudgetCategory::Insurance => self.insurance,
            BudgetCategory::PropertyTax => self.property_tax,
            BudgetCategory::Other => self.other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    #[default]
    Draft,
    Approved,
    Active,
    Closed,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "APPROVED" => Some(Self::Approved),
            "ACTIVE" => Some(Self::Active),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Building budget entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildingBudget {
    pub id: Option<Id>,
    pub building_id: Id,
    pub fiscal_year: i32,
    /// 1..=4 when the budget is quarterly
    pub quarter: Option<i32>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub allocations: CategoryAllocations,
    pub status: BudgetStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BuildingBudget {
    /// Derived sum of the eight allocations; never stored independently.
    pub fn total_budget(&self) -> f64 {
        self.allocations.total()
    }
}

impl Identifiable for BuildingBudget {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for BuildingBudget {
    const TABLE_NAME: &'static str = "building_budgets";
    const TYPE_NAME: &'static str = "BuildingBudget";
}

/// A dated expense against one budget category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetExpense {
    pub id: Option<Id>,
    pub budget_id: Id,
    pub category: BudgetCategory,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for BudgetExpense {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for BudgetExpense {
    const TABLE_NAME: &'static str = "budget_expenses";
    const TYPE_NAME: &'static str = "BudgetExpense";
}
