use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{
    AdvanceStatusRequest, CreateTripRequest, ProfitQuery, TripDetailsResponse, UpdateTripRequest,
};
use crate::dto::ApiResponse;
use crate::models::report::TripProfit;
use crate::models::trip::{Trip, TripFilters};
use crate::services::trip_lifecycle_service::AutoStartReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip).get(list_trips))
        .route("/auto-start", post(auto_start_trips))
        .route(
            "/:id",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/:id/status", post(advance_status))
        .route("/:id/profit", get(trip_profit))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<TripDetailsResponse>>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.create(request).await?))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.list(&filters).await?))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripDetailsResponse>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTripRequest>,
) -> Result<Json<ApiResponse<TripDetailsResponse>>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = TripController::new(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Trip deleted")))
}

async fn advance_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceStatusRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.advance_status(id, &request.status).await?))
}

async fn auto_start_trips(State(state): State<AppState>) -> Result<Json<AutoStartReport>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.auto_start().await?))
}

async fn trip_profit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ProfitQuery>,
) -> Result<Json<TripProfit>, AppError> {
    let controller = TripController::new(&state);
    Ok(Json(controller.profit(id, query.include_road_tolls.into()).await?))
}
