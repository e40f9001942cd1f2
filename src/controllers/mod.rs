//! Controllers
//!
//! Turn validated request bodies into repository and service calls and shape
//! the results for the HTTP layer.

pub mod auth_controller;
pub mod customer_controller;
pub mod maintenance_controller;
pub mod profile_controller;
pub mod report_controller;
pub mod trip_controller;
pub mod truck_controller;
