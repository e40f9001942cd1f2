use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::truck::TruckStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTruckRequest {
    #[validate(length(min = 1, max = 20, message = "Plate number is required"))]
    pub plate_number: String,
    pub model: Option<String>,
    #[validate(range(min = 0.0, message = "Capacity cannot be negative"))]
    pub capacity: Option<f64>,
    pub status: Option<TruckStatus>,
    pub assigned_driver_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTruckRequest {
    pub model: Option<String>,
    #[validate(range(min = 0.0, message = "Capacity cannot be negative"))]
    pub capacity: Option<f64>,
    pub status: Option<TruckStatus>,
    pub assigned_driver_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TruckListQuery {
    pub status: Option<TruckStatus>,
}
