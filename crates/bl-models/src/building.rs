//! Building model

use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed property; parent of building budgets and the occupancy source
/// for portfolio rollups.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Option<Id>,
    pub name: String,
    pub address: Option<String>,
    pub total_units: i32,
    pub occupied_units: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Building {
    pub fn new(name: impl Into<String>, total_units: i32) -> Self {
        Self {
            name: name.into(),
            total_units,
            ..Default::default()
        }
    }

    pub fn vacancy(&self) -> i32 {
        self.total_units - self.occupied_units
    }
}

impl Identifiable for Building {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Building {
    const TABLE_NAME: &'static str = "buildings";
    const TYPE_NAME: &'static str = "Building";
}
