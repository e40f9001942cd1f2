//! HTTP routing
//!
//! `/health` and `/api/auth/*` are public; every other `/api` route requires a
//! bearer token.

pub mod auth_routes;
pub mod customer_routes;
pub mod maintenance_routes;
pub mod profile_routes;
pub mod report_routes;
pub mod trip_routes;
pub mod truck_routes;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, require_auth};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/trucks", truck_routes::create_truck_router())
        .nest("/profiles", profile_routes::create_profile_router())
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/maintenance", maintenance_routes::create_maintenance_router())
        .nest("/reports", report_routes::create_report_router())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .merge(protected);

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "triptrac",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
