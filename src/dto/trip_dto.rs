use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::maintenance_dto::MaintenanceLine;
use crate::models::maintenance::MaintenanceItem;
use crate::models::trip::Trip;

fn default_true() -> bool {
    true
}

/// Monetary fields accept the stored column spellings as aliases.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub customer_id: Uuid,
    pub driver_id: Uuid,
    pub truck_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Origin is required"))]
    pub origin: String,
    #[validate(length(min = 1, max = 255, message = "Destination is required"))]
    pub destination: String,
    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub distance: Option<f64>,
    pub duration: Option<String>,
    #[serde(alias = "RATE")]
    pub rate: Option<f64>,
    #[serde(alias = "FUEL")]
    pub fuel: Option<f64>,
    #[serde(alias = "MILEAGE")]
    pub mileage: Option<f64>,
    #[serde(alias = "SALARY")]
    pub salary: Option<f64>,
    #[serde(alias = "ROAD TOLLS", alias = "ROAD_TOLLS")]
    pub road_tolls: Option<f64>,
    pub maintenance: Option<Vec<MaintenanceLine>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTripRequest {
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub origin: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub destination: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0))]
    pub distance: Option<f64>,
    pub duration: Option<String>,
    #[serde(alias = "RATE")]
    pub rate: Option<f64>,
    #[serde(alias = "FUEL")]
    pub fuel: Option<f64>,
    #[serde(alias = "MILEAGE")]
    pub mileage: Option<f64>,
    #[serde(alias = "SALARY")]
    pub salary: Option<f64>,
    #[serde(alias = "ROAD TOLLS", alias = "ROAD_TOLLS")]
    pub road_tolls: Option<f64>,
    /// Replaces the trip's maintenance items as a set when present.
    pub maintenance: Option<Vec<MaintenanceLine>>,
}

/// `status` is parsed leniently so the legacy `in progress` spelling works.
#[derive(Debug, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfitQuery {
    #[serde(default = "default_true")]
    pub include_road_tolls: bool,
}

/// A trip together with its maintenance items
#[derive(Debug, Serialize)]
pub struct TripDetailsResponse {
    #[serde(flatten)]
    pub trip: Trip,
    pub maintenance: Vec<MaintenanceItem>,
}
