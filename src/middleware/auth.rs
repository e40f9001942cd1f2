//! Bearer-token authentication
//!
//! Validates the JWT on every protected request and injects the caller as an
//! [`AuthenticatedUser`] extension.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::profile::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Caller identity taken from a validated token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let claims = state.jwt.validate(token.trim())?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(request).await)
}
