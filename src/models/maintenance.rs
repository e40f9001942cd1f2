//! Maintenance model
//!
//! A maintenance item is one cost line against a truck, optionally tied to a
//! trip.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maintenance row - maps to the `maintenance` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MaintenanceItem {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub description: String,
    pub cost: Decimal,
    pub maintenance_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Validated data for a new maintenance item
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaintenanceItem {
    pub truck_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub description: String,
    pub cost: Decimal,
    pub maintenance_date: NaiveDate,
}

/// Field edits; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct MaintenanceChanges {
    pub description: Option<String>,
    pub cost: Option<Decimal>,
    pub maintenance_date: Option<NaiveDate>,
}

impl MaintenanceChanges {
    pub fn apply_to(&self, item: &mut MaintenanceItem) {
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(cost) = self.cost {
            item.cost = cost;
        }
        if let Some(date) = self.maintenance_date {
            item.maintenance_date = date;
        }
    }
}
