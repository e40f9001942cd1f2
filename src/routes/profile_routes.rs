use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::profile_controller::ProfileController;
use crate::dto::profile_dto::{ProfileListQuery, UpdateProfileRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::profile::Profile;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_profile_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles))
        .route("/me", get(current_profile))
        .route("/:id", get(get_profile).put(update_profile))
}

async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let controller = ProfileController::new(&state);
    Ok(Json(controller.list(query.role).await?))
}

async fn current_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Profile>, AppError> {
    let controller = ProfileController::new(&state);
    Ok(Json(controller.me(&user).await?))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    let controller = ProfileController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let controller = ProfileController::new(&state);
    Ok(Json(controller.update(&user, id, request).await?))
}
