//! Repositories
//!
//! One trait per store concern. The PostgreSQL implementations live next to
//! their traits; `memory::InMemoryStore` implements every trait and backs the
//! test suite.

pub mod account_repository;
pub mod customer_repository;
pub mod maintenance_repository;
pub mod memory;
pub mod otp_repository;
pub mod profile_repository;
pub mod report_repository;
pub mod trip_repository;
pub mod truck_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::models::maintenance::{MaintenanceChanges, MaintenanceItem, NewMaintenanceItem};
use crate::models::otp::{NewOtp, OtpRecord};
use crate::models::profile::{Credentials, NewAccount, Profile, ProfileChanges, Role};
use crate::models::report::{
    CustomerReportFilters, CustomerReportSource, DateRange, TripReportFilters, TripReportSource,
    TruckReportFilters, TruckReportSource,
};
use crate::models::trip::{NewTrip, Trip, TripChanges, TripFilters, TripStatus};
use crate::models::truck::{NewTruck, Truck, TruckChanges, TruckStatus};
use crate::utils::errors::AppResult;

pub use account_repository::PgAccountRepository;
pub use customer_repository::PgCustomerRepository;
pub use maintenance_repository::PgMaintenanceRepository;
pub use memory::InMemoryStore;
pub use otp_repository::PgOtpRepository;
pub use profile_repository::PgProfileRepository;
pub use report_repository::PgReportRepository;
pub use trip_repository::PgTripRepository;
pub use truck_repository::PgTruckRepository;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: NewCustomer) -> AppResult<Customer>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;
    async fn list(&self) -> AppResult<Vec<Customer>>;
    /// Returns `None` when the customer does not exist.
    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Option<Customer>>;
}

#[async_trait]
pub trait TruckRepository: Send + Sync {
    async fn create(&self, truck: NewTruck) -> AppResult<Truck>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>>;
    async fn list(&self, status: Option<TruckStatus>) -> AppResult<Vec<Truck>>;
    async fn plate_exists(&self, plate_number: &str) -> AppResult<bool>;
    async fn update(&self, id: Uuid, changes: TruckChanges) -> AppResult<Option<Truck>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>>;
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>>;
    async fn list(&self, role: Option<Role>) -> AppResult<Vec<Profile>>;
    async fn update(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>>;
    /// Newest `scheduled_date` first.
    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>>;
    async fn update(&self, id: Uuid, changes: TripChanges) -> AppResult<Option<Trip>>;
    /// Deletes the trip and its maintenance rows. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    /// Writes the new status and a server-side `updated_at`.
    async fn set_status(&self, id: Uuid, status: TripStatus) -> AppResult<Option<Trip>>;
    /// Ids of `scheduled` trips whose `scheduled_date <= now`.
    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> AppResult<Vec<Uuid>>;
    /// Moves the given trips to `ongoing` in one statement, touching only rows
    /// still `scheduled`. Returns the ids actually updated.
    async fn start_scheduled(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn insert(&self, item: NewMaintenanceItem) -> AppResult<MaintenanceItem>;
    async fn update(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<Option<MaintenanceItem>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn list_for_truck(&self, truck_id: Uuid, range: DateRange)
        -> AppResult<Vec<MaintenanceItem>>;
    async fn list_for_trip(&self, trip_id: Uuid) -> AppResult<Vec<MaintenanceItem>>;
    async fn list_for_trips(&self, trip_ids: &[Uuid]) -> AppResult<Vec<MaintenanceItem>>;
    /// Deletes every item of the trip and inserts `items`, atomically.
    async fn replace_for_trip(
        &self,
        trip_id: Uuid,
        items: Vec<NewMaintenanceItem>,
    ) -> AppResult<Vec<MaintenanceItem>>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn trip_rows(
        &self,
        range: DateRange,
        filters: &TripReportFilters,
    ) -> AppResult<Vec<TripReportSource>>;
    async fn customer_rows(
        &self,
        range: DateRange,
        filters: &CustomerReportFilters,
    ) -> AppResult<Vec<CustomerReportSource>>;
    async fn truck_rows(
        &self,
        range: DateRange,
        filters: &TruckReportFilters,
    ) -> AppResult<Vec<TruckReportSource>>;
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Removes unverified, unexpired codes for the email. Returns how many.
    async fn delete_live_for_email(&self, email: &str, now: DateTime<Utc>) -> AppResult<u64>;
    async fn insert(&self, otp: NewOtp) -> AppResult<OtpRecord>;
    /// Most recent unverified record for `email` with this code and
    /// `expires_at > now`.
    async fn find_live(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<OtpRecord>>;
    /// Marks the record verified if it still is unverified. Returns whether a
    /// row changed.
    async fn mark_verified(&self, id: Uuid) -> AppResult<bool>;
    /// Puts a verified record back to unverified so its code can be retried.
    async fn release(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Creates credentials and a verified profile together.
    async fn create_account(&self, account: NewAccount) -> AppResult<Profile>;
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>>;
}
