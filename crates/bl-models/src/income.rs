//! Revenue and non-budget expense streams for the portfolio rollup
//!
//! Both record types are stored verbatim and only ever summed at read time.

use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeKind {
    Rental,
    Other,
}

impl IncomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rental => "RENTAL",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RENTAL" => Some(Self::Rental),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Income received for a building within a period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    pub id: Option<Id>,
    pub building_id: Id,
    pub kind: IncomeKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for IncomeRecord {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for IncomeRecord {
    const TABLE_NAME: &'static str = "income_records";
    const TYPE_NAME: &'static str = "IncomeRecord";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeKind {
    ContractorPayment,
    OrderCost,
}

impl ChargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractorPayment => "CONTRACTOR_PAYMENT",
            Self::OrderCost => "ORDER_COST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONTRACTOR_PAYMENT" => Some(Self::ContractorPayment),
            "ORDER_COST" => Some(Self::OrderCost),
            _ => None,
        }
    }
}

/// A building-level charge outside any budget ledger (contractor payments,
/// order costs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingCharge {
    pub id: Option<Id>,
    pub building_id: Id,
    pub kind: ChargeKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for BuildingCharge {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for BuildingCharge {
    const TABLE_NAME: &'static str = "building_charges";
    const TYPE_NAME: &'static str = "BuildingCharge";
}
