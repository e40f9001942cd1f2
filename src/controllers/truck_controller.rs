use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::truck_dto::{CreateTruckRequest, UpdateTruckRequest};
use crate::dto::ApiResponse;
use crate::models::truck::{NewTruck, Truck, TruckChanges, TruckStatus};
use crate::repositories::{ProfileRepository, TruckRepository};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};
use crate::utils::validation::{require_text, validate_amount};

pub struct TruckController {
    trucks: Arc<dyn TruckRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl TruckController {
    pub fn new(state: &AppState) -> Self {
        Self {
            trucks: state.trucks.clone(),
            profiles: state.profiles.clone(),
        }
    }

    async fn ensure_driver_exists(&self, driver_id: Option<Uuid>) -> AppResult<()> {
        if let Some(id) = driver_id {
            if self.profiles.find_by_id(id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Assigned driver '{}' does not exist",
                    id
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, request: CreateTruckRequest) -> AppResult<ApiResponse<Truck>> {
        request.validate()?;

        let plate_number = require_text("plate_number", &request.plate_number)?.to_uppercase();
        if self.trucks.plate_exists(&plate_number).await? {
            return Err(conflict_error("Truck", "plate number", &plate_number));
        }
        self.ensure_driver_exists(request.assigned_driver_id).await?;

        let truck = self
            .trucks
            .create(NewTruck {
                plate_number,
                model: request.model,
                capacity: validate_amount("capacity", request.capacity)?,
                status: request.status.unwrap_or(TruckStatus::Active),
                assigned_driver_id: request.assigned_driver_id,
            })
            .await?;

        tracing::info!("🚛 Truck {} ({}) created", truck.id, truck.plate_number);
        Ok(ApiResponse::success_with_message(truck, "Truck created"))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Truck> {
        self.trucks
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Truck", &id))
    }

    pub async fn list(&self, status: Option<TruckStatus>) -> AppResult<Vec<Truck>> {
        self.trucks.list(status).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTruckRequest,
    ) -> AppResult<ApiResponse<Truck>> {
        request.validate()?;
        self.ensure_driver_exists(request.assigned_driver_id).await?;

        let changes = TruckChanges {
            model: request.model,
            capacity: validate_amount("capacity", request.capacity)?,
            status: request.status,
            assigned_driver_id: request.assigned_driver_id,
        };

        let truck = self
            .trucks
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Truck", &id))?;

        Ok(ApiResponse::success_with_message(truck, "Truck updated"))
    }
}
