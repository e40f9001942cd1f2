//! In-memory store
//!
//! Implements every repository trait over plain maps behind one `RwLock`, so
//! each trait method is atomic the same way a single SQL statement (or the
//! transactional ones) is. Used by the test suite and for running the API
//! without a database.

use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountRepository, CustomerRepository, MaintenanceRepository, OtpRepository,
    ProfileRepository, ReportRepository, TripRepository, TruckRepository,
};
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
use crate::utils::errors::{conflict_error, AppResult};

#[derive(Debug, Clone)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(Default)]
struct MemoryState {
    customers: HashMap<Uuid, Customer>,
    trucks: HashMap<Uuid, Truck>,
    profiles: HashMap<Uuid, Profile>,
    trips: HashMap<Uuid, Trip>,
    maintenance: HashMap<Uuid, MaintenanceItem>,
    otps: Vec<OtpRecord>,
    users: Vec<UserRow>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    #[cfg(any(test, feature = "test-support"))]
    fail_maintenance_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check_maintenance_writes(&self) -> AppResult<()> {
        if self.fail_maintenance_writes.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check_maintenance_writes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Fault injection and fixtures for tests. Not compiled into release builds
/// unless the `test-support` feature is on.
#[cfg(any(test, feature = "test-support"))]
impl InMemoryStore {
    /// Makes every maintenance write fail with a store error until reset.
    pub fn fail_maintenance_writes(&self, fail: bool) {
        self.fail_maintenance_writes.store(fail, Ordering::SeqCst);
    }

    /// Inserts a profile directly, without credentials.
    pub async fn seed_profile(&self, name: &str, role: Role) -> Profile {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            phone: None,
            role,
            is_verified: true,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .profiles
            .insert(profile.id, profile.clone());
        profile
    }

    /// Overrides a customer's `created_at`.
    pub async fn backdate_customer(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(customer) = self.state.write().await.customers.get_mut(&id) {
            customer.created_at = created_at;
        }
    }

    /// Overrides a truck's `created_at`.
    pub async fn backdate_truck(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(truck) = self.state.write().await.trucks.get_mut(&id) {
            truck.created_at = created_at;
        }
    }

    /// Number of OTP rows currently stored for an email.
    pub async fn otp_count(&self, email: &str) -> usize {
        self.state
            .read()
            .await
            .otps
            .iter()
            .filter(|o| o.email == email)
            .count()
    }
}

fn new_maintenance_row(item: NewMaintenanceItem) -> MaintenanceItem {
    MaintenanceItem {
        id: Uuid::new_v4(),
        truck_id: item.truck_id,
        trip_id: item.trip_id,
        description: item.description,
        cost: item.cost,
        maintenance_date: item.maintenance_date,
        created_at: Utc::now(),
    }
}

fn sort_maintenance(items: &mut [MaintenanceItem]) {
    items.sort_by(|a, b| {
        b.maintenance_date
            .cmp(&a.maintenance_date)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn create(&self, customer: NewCustomer) -> AppResult<Customer> {
        let now = Utc::now();
        let created = Customer {
            id: Uuid::new_v4(),
            name: customer.name,
            contact_person: customer.contact_person,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .customers
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.state.read().await.customers.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Customer>> {
        let mut customers: Vec<Customer> =
            self.state.read().await.customers.values().cloned().collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Option<Customer>> {
        let mut state = self.state.write().await;
        Ok(state.customers.get_mut(&id).map(|customer| {
            changes.apply_to(customer);
            customer.updated_at = Utc::now();
            customer.clone()
        }))
    }
}

#[async_trait]
impl TruckRepository for InMemoryStore {
    async fn create(&self, truck: NewTruck) -> AppResult<Truck> {
        let mut state = self.state.write().await;
        if state
            .trucks
            .values()
            .any(|t| t.plate_number.eq_ignore_ascii_case(&truck.plate_number))
        {
            return Err(conflict_error("Truck", "plate number", &truck.plate_number));
        }
        let now = Utc::now();
        let created = Truck {
            id: Uuid::new_v4(),
            plate_number: truck.plate_number,
            model: truck.model,
            capacity: truck.capacity,
            status: truck.status,
            assigned_driver_id: truck.assigned_driver_id,
            created_at: now,
            updated_at: now,
        };
        state.trucks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>> {
        Ok(self.state.read().await.trucks.get(&id).cloned())
    }

    async fn list(&self, status: Option<TruckStatus>) -> AppResult<Vec<Truck>> {
        let mut trucks: Vec<Truck> = self
            .state
            .read()
            .await
            .trucks
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        trucks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trucks)
    }

    async fn plate_exists(&self, plate_number: &str) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .trucks
            .values()
            .any(|t| t.plate_number.eq_ignore_ascii_case(plate_number)))
    }

    async fn update(&self, id: Uuid, changes: TruckChanges) -> AppResult<Option<Truck>> {
        let mut state = self.state.write().await;
        Ok(state.trucks.get_mut(&id).map(|truck| {
            changes.apply_to(truck);
            truck.updated_at = Utc::now();
            truck.clone()
        }))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self
            .state
            .read()
            .await
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list(&self, role: Option<Role>) -> AppResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .state
            .read()
            .await
            .profiles
            .values()
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn update(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>> {
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(&id).map(|profile| {
            changes.apply_to(profile);
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }
}

#[async_trait]
impl TripRepository for InMemoryStore {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip> {
        let now = Utc::now();
        let created = Trip {
            id: Uuid::new_v4(),
            customer_id: trip.customer_id,
            driver_id: trip.driver_id,
            truck_id: trip.truck_id,
            origin: trip.origin,
            destination: trip.destination,
            scheduled_date: trip.scheduled_date,
            distance: trip.distance,
            duration: trip.duration,
            rate: trip.charges.rate,
            fuel: trip.charges.fuel,
            mileage: trip.charges.mileage,
            salary: trip.charges.salary,
            road_tolls: trip.charges.road_tolls,
            status: TripStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .trips
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self.state.read().await.trips.get(&id).cloned())
    }

    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let mut trips: Vec<Trip> = self
            .state
            .read()
            .await
            .trips
            .values()
            .filter(|t| filters.matches(t))
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(trips)
    }

    async fn update(&self, id: Uuid, changes: TripChanges) -> AppResult<Option<Trip>> {
        let mut state = self.state.write().await;
        Ok(state.trips.get_mut(&id).map(|trip| {
            changes.apply_to(trip);
            trip.updated_at = Utc::now();
            trip.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.maintenance.retain(|_, item| item.trip_id != Some(id));
        Ok(state.trips.remove(&id).is_some())
    }

    async fn set_status(&self, id: Uuid, status: TripStatus) -> AppResult<Option<Trip>> {
        let mut state = self.state.write().await;
        Ok(state.trips.get_mut(&id).map(|trip| {
            trip.status = status;
            trip.updated_at = Utc::now();
            trip.clone()
        }))
    }

    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        let mut due: Vec<&Trip> = state
            .trips
            .values()
            .filter(|t| t.status == TripStatus::Scheduled && t.scheduled_date <= now)
            .collect();
        due.sort_by_key(|t| t.scheduled_date);
        Ok(due.into_iter().map(|t| t.id).collect())
    }

    async fn start_scheduled(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut started = Vec::new();
        for id in ids {
            if let Some(trip) = state.trips.get_mut(id) {
                if trip.status == TripStatus::Scheduled {
                    trip.status = TripStatus::Ongoing;
                    trip.updated_at = now;
                    started.push(*id);
                }
            }
        }
        Ok(started)
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryStore {
    async fn insert(&self, item: NewMaintenanceItem) -> AppResult<MaintenanceItem> {
        self.check_maintenance_writes()?;
        let created = new_maintenance_row(item);
        self.state
            .write()
            .await
            .maintenance
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<Option<MaintenanceItem>> {
        self.check_maintenance_writes()?;
        let mut state = self.state.write().await;
        Ok(state.maintenance.get_mut(&id).map(|item| {
            changes.apply_to(item);
            item.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.check_maintenance_writes()?;
        Ok(self.state.write().await.maintenance.remove(&id).is_some())
    }

    async fn list_for_truck(
        &self,
        truck_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<MaintenanceItem>> {
        let mut items: Vec<MaintenanceItem> = self
            .state
            .read()
            .await
            .maintenance
            .values()
            .filter(|m| m.truck_id == truck_id && range.contains(m.maintenance_date))
            .cloned()
            .collect();
        sort_maintenance(&mut items);
        Ok(items)
    }

    async fn list_for_trip(&self, trip_id: Uuid) -> AppResult<Vec<MaintenanceItem>> {
        let mut items: Vec<MaintenanceItem> = self
            .state
            .read()
            .await
            .maintenance
            .values()
            .filter(|m| m.trip_id == Some(trip_id))
            .cloned()
            .collect();
        sort_maintenance(&mut items);
        Ok(items)
    }

    async fn list_for_trips(&self, trip_ids: &[Uuid]) -> AppResult<Vec<MaintenanceItem>> {
        Ok(self
            .state
            .read()
            .await
            .maintenance
            .values()
            .filter(|m| m.trip_id.map_or(false, |id| trip_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn replace_for_trip(
        &self,
        trip_id: Uuid,
        items: Vec<NewMaintenanceItem>,
    ) -> AppResult<Vec<MaintenanceItem>> {
        self.check_maintenance_writes()?;
        let mut state = self.state.write().await;
        state.maintenance.retain(|_, item| item.trip_id != Some(trip_id));
        let inserted: Vec<MaintenanceItem> = items.into_iter().map(new_maintenance_row).collect();
        for item in &inserted {
            state.maintenance.insert(item.id, item.clone());
        }
        Ok(inserted)
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn trip_rows(
        &self,
        range: DateRange,
        filters: &TripReportFilters,
    ) -> AppResult<Vec<TripReportSource>> {
        let state = self.state.read().await;
        let mut rows: Vec<TripReportSource> = state
            .trips
            .values()
            .filter(|t| range.contains_instant(t.scheduled_date))
            .filter(|t| filters.status.map_or(true, |s| t.status == s))
            .filter(|t| filters.customer_id.map_or(true, |id| t.customer_id == id))
            .filter(|t| filters.truck_id.map_or(true, |id| t.truck_id == id))
            .filter(|t| filters.driver_id.map_or(true, |id| t.driver_id == id))
            .map(|t| {
                let truck = state.trucks.get(&t.truck_id);
                TripReportSource {
                    id: t.id,
                    scheduled_date: t.scheduled_date,
                    status: t.status,
                    origin: t.origin.clone(),
                    destination: t.destination.clone(),
                    distance: t.distance,
                    rate: t.rate,
                    fuel: t.fuel,
                    mileage: t.mileage,
                    salary: t.salary,
                    road_tolls: t.road_tolls,
                    customer_name: state.customers.get(&t.customer_id).map(|c| c.name.clone()),
                    truck_plate: truck.map(|k| k.plate_number.clone()),
                    truck_model: truck.and_then(|k| k.model.clone()),
                    driver_name: state.profiles.get(&t.driver_id).map(|p| p.name.clone()),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(rows)
    }

    async fn customer_rows(
        &self,
        range: DateRange,
        _filters: &CustomerReportFilters,
    ) -> AppResult<Vec<CustomerReportSource>> {
        let state = self.state.read().await;
        let mut rows: Vec<CustomerReportSource> = state
            .customers
            .values()
            .filter(|c| range.contains_instant(c.created_at))
            .map(|c| CustomerReportSource {
                id: c.id,
                name: c.name.clone(),
                contact_person: c.contact_person.clone(),
                email: c.email.clone(),
                phone: c.phone.clone(),
                address: c.address.clone(),
                created_at: c.created_at,
                trip_count: state.trips.values().filter(|t| t.customer_id == c.id).count() as i64,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn truck_rows(
        &self,
        range: DateRange,
        filters: &TruckReportFilters,
    ) -> AppResult<Vec<TruckReportSource>> {
        let state = self.state.read().await;
        let mut rows: Vec<TruckReportSource> = state
            .trucks
            .values()
            .filter(|k| range.contains_instant(k.created_at))
            .filter(|k| filters.status.map_or(true, |s| k.status == s))
            .filter(|k| {
                filters
                    .assigned_driver_id
                    .map_or(true, |id| k.assigned_driver_id == Some(id))
            })
            .map(|k| TruckReportSource {
                id: k.id,
                plate_number: k.plate_number.clone(),
                model: k.model.clone(),
                capacity: k.capacity,
                status: k.status,
                driver_name: k
                    .assigned_driver_id
                    .and_then(|id| state.profiles.get(&id))
                    .map(|p| p.name.clone()),
                created_at: k.created_at,
                trip_count: state.trips.values().filter(|t| t.truck_id == k.id).count() as i64,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl OtpRepository for InMemoryStore {
    async fn delete_live_for_email(&self, email: &str, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.otps.len();
        state.otps.retain(|o| !(o.email == email && o.is_live(now)));
        Ok((before - state.otps.len()) as u64)
    }

    async fn insert(&self, otp: NewOtp) -> AppResult<OtpRecord> {
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: otp.email,
            code: otp.code,
            expires_at: otp.expires_at,
            verified: false,
            user_data: otp.user_data.map(sqlx::types::Json),
            created_at: Utc::now(),
        };
        self.state.write().await.otps.push(record.clone());
        Ok(record)
    }

    async fn find_live(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<OtpRecord>> {
        Ok(self
            .state
            .read()
            .await
            .otps
            .iter()
            .filter(|o| o.email == email && o.code == code && o.is_live(now))
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.otps.iter_mut().find(|o| o.id == id && !o.verified) {
            Some(record) => {
                record.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release(&self, id: Uuid) -> AppResult<()> {
        if let Some(record) = self.state.write().await.otps.iter_mut().find(|o| o.id == id) {
            record.verified = false;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create_account(&self, account: NewAccount) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == account.email) {
            return Err(conflict_error("Account", "email", &account.email));
        }
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        state.users.push(UserRow {
            id: user_id,
            email: account.email,
            password_hash: account.password_hash,
        });
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            name: account.name,
            phone: account.phone,
            role: account.role,
            is_verified: true,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.state.read().await.users.iter().any(|u| u.email == email))
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email)
            .and_then(|user| {
                state
                    .profiles
                    .values()
                    .find(|p| p.user_id == user.id)
                    .map(|profile| Credentials {
                        user_id: user.id,
                        email: user.email.clone(),
                        password_hash: user.password_hash.clone(),
                        role: profile.role,
                        is_verified: profile.is_verified,
                    })
            }))
    }
}
