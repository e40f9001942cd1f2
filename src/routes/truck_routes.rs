use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::truck_controller::TruckController;
use crate::dto::truck_dto::{CreateTruckRequest, TruckListQuery, UpdateTruckRequest};
use crate::dto::ApiResponse;
use crate::models::truck::Truck;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_truck_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_truck).get(list_trucks))
        .route("/:id", get(get_truck).put(update_truck))
}

async fn create_truck(
    State(state): State<AppState>,
    Json(request): Json<CreateTruckRequest>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let controller = TruckController::new(&state);
    Ok(Json(controller.create(request).await?))
}

async fn get_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Truck>, AppError> {
    let controller = TruckController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn list_trucks(
    State(state): State<AppState>,
    Query(query): Query<TruckListQuery>,
) -> Result<Json<Vec<Truck>>, AppError> {
    let controller = TruckController::new(&state);
    Ok(Json(controller.list(query.status).await?))
}

async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTruckRequest>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let controller = TruckController::new(&state);
    Ok(Json(controller.update(id, request).await?))
}
