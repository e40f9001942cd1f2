//! Request and response bodies for the HTTP API

pub mod api_response;
pub mod auth_dto;
pub mod customer_dto;
pub mod maintenance_dto;
pub mod profile_dto;
pub mod report_dto;
pub mod trip_dto;
pub mod truck_dto;

pub use api_response::ApiResponse;
