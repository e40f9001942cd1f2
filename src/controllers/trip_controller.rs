use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::maintenance_dto::drafts_from_lines;
use crate::dto::trip_dto::{CreateTripRequest, TripDetailsResponse, UpdateTripRequest};
use crate::dto::ApiResponse;
use crate::models::report::{RoadTolls, TripProfit};
use crate::models::trip::{NewTrip, Trip, TripChanges, TripCharges, TripFilters, TripStatus};
use crate::repositories::{CustomerRepository, ProfileRepository, TripRepository, TruckRepository};
use crate::services::maintenance_ledger::MaintenanceLedger;
use crate::services::profit_aggregator::compute_profit;
use crate::services::trip_lifecycle_service::{AutoStartReport, TripLifecycleService};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{require_text, validate_amount};

pub struct TripController {
    trips: Arc<dyn TripRepository>,
    customers: Arc<dyn CustomerRepository>,
    profiles: Arc<dyn ProfileRepository>,
    trucks: Arc<dyn TruckRepository>,
    lifecycle: TripLifecycleService,
    ledger: MaintenanceLedger,
}

/// Primary write committed, maintenance write failed.
fn maintenance_failure(completed: &str, error: AppError) -> AppError {
    tracing::error!("❌ Maintenance write failed after '{}': {}", completed, error);
    AppError::PartialFailure {
        completed: completed.to_string(),
        failed: "maintenance items could not be saved".to_string(),
    }
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            trips: state.trips.clone(),
            customers: state.customers.clone(),
            profiles: state.profiles.clone(),
            trucks: state.trucks.clone(),
            lifecycle: state.lifecycle(),
            ledger: state.ledger(),
        }
    }

    /// Every given reference must point at an existing row.
    async fn check_references(
        &self,
        customer_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        truck_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(id) = customer_id {
            if self.customers.find_by_id(id).await?.is_none() {
                return Err(AppError::InvalidInput(format!("Customer '{}' does not exist", id)));
            }
        }
        if let Some(id) = driver_id {
            if self.profiles.find_by_id(id).await?.is_none() {
                return Err(AppError::InvalidInput(format!("Driver '{}' does not exist", id)));
            }
        }
        if let Some(id) = truck_id {
            if self.trucks.find_by_id(id).await?.is_none() {
                return Err(AppError::InvalidInput(format!("Truck '{}' does not exist", id)));
            }
        }
        Ok(())
    }

    pub async fn create(
        &self,
        request: CreateTripRequest,
    ) -> AppResult<ApiResponse<TripDetailsResponse>> {
        request.validate()?;
        let drafts = request
            .maintenance
            .as_deref()
            .map(drafts_from_lines)
            .transpose()?;
        self.check_references(
            Some(request.customer_id),
            Some(request.driver_id),
            Some(request.truck_id),
        )
        .await?;

        let trip = self
            .trips
            .create(NewTrip {
                customer_id: request.customer_id,
                driver_id: request.driver_id,
                truck_id: request.truck_id,
                origin: require_text("origin", &request.origin)?,
                destination: require_text("destination", &request.destination)?,
                scheduled_date: request.scheduled_date,
                distance: validate_amount("distance", request.distance)?,
                duration: request.duration,
                charges: TripCharges {
                    rate: validate_amount("RATE", request.rate)?,
                    fuel: validate_amount("FUEL", request.fuel)?,
                    mileage: validate_amount("MILEAGE", request.mileage)?,
                    salary: validate_amount("SALARY", request.salary)?,
                    road_tolls: validate_amount("ROAD TOLLS", request.road_tolls)?,
                },
            })
            .await?;
        tracing::info!("🗺️ Trip {} created ({} -> {})", trip.id, trip.origin, trip.destination);

        let maintenance = match drafts {
            Some(drafts) if !drafts.is_empty() => self
                .ledger
                .replace_for_trip(trip.id, trip.truck_id, drafts)
                .await
                .map_err(|e| maintenance_failure("Trip created", e))?,
            _ => Vec::new(),
        };

        Ok(ApiResponse::success_with_message(
            TripDetailsResponse { trip, maintenance },
            "Trip created",
        ))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<TripDetailsResponse> {
        let trip = self.find(id).await?;
        let maintenance = self.ledger.list_for_trip(id).await?;
        Ok(TripDetailsResponse { trip, maintenance })
    }

    async fn find(&self, id: Uuid) -> AppResult<Trip> {
        self.trips
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Trip", &id))
    }

    pub async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        self.trips.list(filters).await
    }

    /// Field edits are committed first; a maintenance list, when given, is
    /// then replaced as a set.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTripRequest,
    ) -> AppResult<ApiResponse<TripDetailsResponse>> {
        request.validate()?;
        let drafts = request
            .maintenance
            .as_deref()
            .map(drafts_from_lines)
            .transpose()?;
        self.check_references(request.customer_id, request.driver_id, request.truck_id)
            .await?;

        let changes = TripChanges {
            customer_id: request.customer_id,
            driver_id: request.driver_id,
            truck_id: request.truck_id,
            origin: request
                .origin
                .as_deref()
                .map(|v| require_text("origin", v))
                .transpose()?,
            destination: request
                .destination
                .as_deref()
                .map(|v| require_text("destination", v))
                .transpose()?,
            scheduled_date: request.scheduled_date,
            distance: validate_amount("distance", request.distance)?,
            duration: request.duration,
            rate: validate_amount("RATE", request.rate)?,
            fuel: validate_amount("FUEL", request.fuel)?,
            mileage: validate_amount("MILEAGE", request.mileage)?,
            salary: validate_amount("SALARY", request.salary)?,
            road_tolls: validate_amount("ROAD TOLLS", request.road_tolls)?,
        };

        let trip = self
            .trips
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Trip", &id))?;

        let maintenance = match drafts {
            Some(drafts) => self
                .ledger
                .replace_for_trip(id, trip.truck_id, drafts)
                .await
                .map_err(|e| maintenance_failure("Trip updated", e))?,
            None => self.ledger.list_for_trip(id).await?,
        };

        Ok(ApiResponse::success_with_message(
            TripDetailsResponse { trip, maintenance },
            "Trip updated",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.trips.delete(id).await? {
            return Err(not_found_error("Trip", &id));
        }
        tracing::info!("🗑️ Trip {} deleted", id);
        Ok(())
    }

    pub async fn advance_status(&self, id: Uuid, status: &str) -> AppResult<ApiResponse<Trip>> {
        let target: TripStatus = status
            .parse()
            .map_err(|e: crate::models::UnknownVariant| AppError::InvalidInput(e.to_string()))?;
        let trip = self.lifecycle.advance_status(id, target).await?;
        Ok(ApiResponse::success_with_message(
            trip,
            format!("Trip is now {}", target),
        ))
    }

    pub async fn auto_start(&self) -> AppResult<AutoStartReport> {
        self.lifecycle.auto_start_due_trips(Utc::now()).await
    }

    pub async fn profit(&self, id: Uuid, road_tolls: RoadTolls) -> AppResult<TripProfit> {
        let trip = self.find(id).await?;
        let maintenance = self.ledger.list_for_trip(id).await?;
        Ok(compute_profit(&trip.charges(), &maintenance, road_tolls))
    }
}
