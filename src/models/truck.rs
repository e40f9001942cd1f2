//! Truck model
//!
//! Truck status is edited by fleet admins only; nothing derives it from trip
//! activity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

/// Truck status - stored as text in `trucks.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruckStatus {
    Active,
    Inactive,
    Maintenance,
}

impl TruckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruckStatus::Active => "active",
            TruckStatus::Inactive => "inactive",
            TruckStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TruckStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(TruckStatus::Active),
            "inactive" => Ok(TruckStatus::Inactive),
            "maintenance" => Ok(TruckStatus::Maintenance),
            other => Err(UnknownVariant {
                kind: "truck status",
                value: other.to_string(),
            }),
        }
    }
}

super::text_column_enum!(TruckStatus);

/// Truck row - maps to the `trucks` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Truck {
    pub id: Uuid,
    pub plate_number: String,
    pub model: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: TruckStatus,
    pub assigned_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a new truck
#[derive(Debug, Clone)]
pub struct NewTruck {
    pub plate_number: String,
    pub model: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: TruckStatus,
    pub assigned_driver_id: Option<Uuid>,
}

/// Field edits; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct TruckChanges {
    pub model: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: Option<TruckStatus>,
    pub assigned_driver_id: Option<Uuid>,
}

impl TruckChanges {
    pub fn apply_to(&self, truck: &mut Truck) {
        truck.model = self.model.clone().or_else(|| truck.model.take());
        truck.capacity = self.capacity.or(truck.capacity);
        if let Some(status) = self.status {
            truck.status = status;
        }
        truck.assigned_driver_id = self.assigned_driver_id.or(truck.assigned_driver_id);
    }
}
