use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::maintenance_controller::MaintenanceController;
use crate::dto::maintenance_dto::{
    CreateMaintenanceRequest, MaintenanceRangeQuery, ReplaceMaintenanceRequest,
    UpdateMaintenanceRequest,
};
use crate::dto::ApiResponse;
use crate::models::maintenance::MaintenanceItem;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item))
        .route("/truck/:truck_id", get(list_for_truck))
        .route("/trip/:trip_id", get(list_for_trip).put(replace_for_trip))
        .route("/:id", put(update_item).delete(delete_item))
}

async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceItem>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.create(request).await?))
}

async fn list_for_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Query(query): Query<MaintenanceRangeQuery>,
) -> Result<Json<Vec<MaintenanceItem>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.list_for_truck(truck_id, query).await?))
}

async fn list_for_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<MaintenanceItem>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.list_for_trip(trip_id).await?))
}

async fn replace_for_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(request): Json<ReplaceMaintenanceRequest>,
) -> Result<Json<ApiResponse<Vec<MaintenanceItem>>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.replace_for_trip(trip_id, request).await?))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceItem>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = MaintenanceController::new(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Maintenance item deleted")))
}
