use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::maintenance_dto::{
    drafts_from_lines, CreateMaintenanceRequest, MaintenanceRangeQuery,
    ReplaceMaintenanceRequest, UpdateMaintenanceRequest,
};
use crate::dto::ApiResponse;
use crate::models::maintenance::MaintenanceItem;
use crate::models::report::DateRange;
use crate::repositories::TripRepository;
use crate::services::maintenance_ledger::{MaintenanceDraft, MaintenanceLedger};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct MaintenanceController {
    ledger: MaintenanceLedger,
    trips: Arc<dyn TripRepository>,
}

impl MaintenanceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            ledger: state.ledger(),
            trips: state.trips.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceItem>> {
        request.validate()?;
        let draft =
            MaintenanceDraft::new(&request.description, request.cost, request.maintenance_date)?;
        let item = self
            .ledger
            .add_item(request.truck_id, request.trip_id, draft)
            .await?;
        Ok(ApiResponse::success_with_message(item, "Maintenance item recorded"))
    }

    pub async fn list_for_truck(
        &self,
        truck_id: Uuid,
        query: MaintenanceRangeQuery,
    ) -> AppResult<Vec<MaintenanceItem>> {
        let range = DateRange::new(query.from, query.to)?;
        self.ledger.list_for_truck(truck_id, range).await
    }

    pub async fn list_for_trip(&self, trip_id: Uuid) -> AppResult<Vec<MaintenanceItem>> {
        self.ledger.list_for_trip(trip_id).await
    }

    pub async fn replace_for_trip(
        &self,
        trip_id: Uuid,
        request: ReplaceMaintenanceRequest,
    ) -> AppResult<ApiResponse<Vec<MaintenanceItem>>> {
        let drafts = drafts_from_lines(&request.items)?;
        let truck_id = match request.truck_id {
            Some(id) => id,
            None => {
                self.trips
                    .find_by_id(trip_id)
                    .await?
                    .ok_or_else(|| not_found_error("Trip", &trip_id))?
                    .truck_id
            }
        };

        let items = self.ledger.replace_for_trip(trip_id, truck_id, drafts).await?;
        Ok(ApiResponse::success_with_message(
            items,
            "Maintenance items replaced",
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceItem>> {
        request.validate()?;
        let item = self
            .ledger
            .update_item(
                id,
                request.description.as_deref(),
                request.cost,
                request.maintenance_date,
            )
            .await?;
        Ok(ApiResponse::success_with_message(item, "Maintenance item updated"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.ledger.delete_item(id).await
    }
}
