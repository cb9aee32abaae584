//! Risk register model
//!
//! Severity is a pure derivation over the probability×impact matrix and is
//! never stored.

use bl_core::error::ValidationErrors;
use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Technical,
    Financial,
    Schedule,
    Resource,
    External,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Financial => "FINANCIAL",
            Self::Schedule => "SCHEDULE",
            Self::Resource => "RESOURCE",
            Self::External => "EXTERNAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TECHNICAL" => Some(Self::Technical),
            "FINANCIAL" => Some(Self::Financial),
            "SCHEDULE" => Some(Self::Schedule),
            "RESOURCE" => Some(Self::Resource),
            "EXTERNAL" => Some(Self::External),
            _ => None,
        }
    }
}

/// Shared scale for probability, impact, and the derived severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// Conservative severity matrix: a single HIGH on either axis forces HIGH;
/// the two axes are never averaged.
pub fn severity(probability: RiskLevel, impact: RiskLevel) -> RiskLevel {
    if probability == RiskLevel::High || impact == RiskLevel::High {
        RiskLevel::High
    } else if probability == RiskLevel::Medium || impact == RiskLevel::Medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    #[default]
    Open,
    Mitigated,
    Closed,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Mitigated => "MITIGATED",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "MITIGATED" => Some(Self::Mitigated),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// All six directed edges are permitted; CLOSED is terminal only by
    /// convention. Kept separate from the strict payment validator.
    pub fn validate_transition(_from: Self, _to: Self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Risk entity, attached to a milestone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: Option<Id>,
    pub milestone_id: Id,
    pub description: String,
    pub category: RiskCategory,
    pub probability: RiskLevel,
    pub impact: RiskLevel,
    pub mitigation_strategy: Option<String>,
    pub status: RiskStatus,
    pub created_by: Id,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Risk {
    pub fn severity(&self) -> RiskLevel {
        severity(self.probability, self.impact)
    }

    pub fn is_open(&self) -> bool {
        self.status == RiskStatus::Open
    }
}

impl Identifiable for Risk {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Risk {
    const TABLE_NAME: &'static str = "risks";
    const TYPE_NAME: &'static str = "Risk";
}

#[cfg(test)]
mod tests {
    use super::*;
    use RiskLevel::*;

    #[test]
    fn test_severity_matrix() {
        assert_eq!(severity(High, Low), High);
        assert_eq!(severity(Low, High), High);
        assert_eq!(severity(Low, Medium), Medium);
        assert_eq!(severity(Medium, Low), Medium);
        assert_eq!(severity(Medium, Medium), Medium);
        assert_eq!(severity(Low, Low), Low);
        assert_eq!(severity(High, High), High);
    }

    #[test]
    fn test_all_status_edges_permitted() {
        use RiskStatus::*;
        for from in [Open, Mitigated, Closed] {
            for to in [Open, Mitigated, Closed] {
                assert!(RiskStatus::validate_transition(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_enum_round_trips() {
        for c in [
            RiskCategory::Technical,
            RiskCategory::Financial,
            RiskCategory::Schedule,
            RiskCategory::Resource,
            RiskCategory::External,
        ] {
            assert_eq!(RiskCategory::parse(c.as_str()), Some(c));
        }
        for l in [Low, Medium, High] {
            assert_eq!(RiskLevel::parse(l.as_str()), Some(l));
        }
    }
}
