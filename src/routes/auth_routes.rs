use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{
    IssueOtpRequest, IssueOtpResponse, LoginRequest, LoginResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Unauthenticated routes under `/api/auth`.
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/otp/issue", post(issue_otp))
        .route("/otp/verify", post(verify_otp))
        .route("/login", post(login))
}

async fn issue_otp(
    State(state): State<AppState>,
    Json(request): Json<IssueOtpRequest>,
) -> Result<Json<IssueOtpResponse>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.issue_otp(request).await?))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.verify_otp(request).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.login(request).await?))
}
