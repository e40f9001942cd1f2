use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::services::maintenance_ledger::MaintenanceDraft;
use crate::utils::errors::AppResult;

/// One maintenance line as submitted with a trip or a batch replace
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceLine {
    pub description: String,
    pub cost: f64,
    pub maintenance_date: Option<NaiveDate>,
}

impl MaintenanceLine {
    pub fn to_draft(&self) -> AppResult<MaintenanceDraft> {
        MaintenanceDraft::new(&self.description, self.cost, self.maintenance_date)
    }
}

/// Validates every line before anything is written.
pub fn drafts_from_lines(lines: &[MaintenanceLine]) -> AppResult<Vec<MaintenanceDraft>> {
    lines.iter().map(MaintenanceLine::to_draft).collect()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub truck_id: Uuid,
    pub trip_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    pub cost: f64,
    pub maintenance_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub maintenance_date: Option<NaiveDate>,
}

/// Body of a batch replace; `truck_id` defaults to the trip's truck.
#[derive(Debug, Deserialize)]
pub struct ReplaceMaintenanceRequest {
    pub truck_id: Option<Uuid>,
    pub items: Vec<MaintenanceLine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
