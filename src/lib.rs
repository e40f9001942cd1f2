//! TripTrac backend
//!
//! Trip lifecycle, maintenance ledger, profit and reporting for a small
//! trucking operation, exposed over an axum HTTP API backed by PostgreSQL.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
