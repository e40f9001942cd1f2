//! Business services
//!
//! Each service owns one piece of business logic and talks to the store only
//! through the repository traits, so it runs the same over PostgreSQL and the
//! in-memory store.

pub mod auth_service;
pub mod csv_export;
pub mod jwt_service;
pub mod maintenance_ledger;
pub mod otp_delivery;
pub mod otp_service;
pub mod profit_aggregator;
pub mod report_service;
pub mod trip_lifecycle_service;
pub mod trip_scheduler;

pub use auth_service::AuthService;
pub use jwt_service::{Claims, JwtService};
pub use maintenance_ledger::{total_cost, MaintenanceDraft, MaintenanceLedger};
pub use otp_delivery::{HttpOtpDelivery, LogOtpDelivery, OtpDelivery};
#[cfg(any(test, feature = "test-support"))]
pub use otp_delivery::RecordingOtpDelivery;
pub use otp_service::{OtpService, SignupData};
pub use profit_aggregator::compute_profit;
pub use report_service::{ReportRows, ReportService};
pub use trip_lifecycle_service::{AutoStartReport, TripLifecycleService};
