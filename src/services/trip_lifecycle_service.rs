//! Trip lifecycle
//!
//! Moves trips through the status machine defined on [`TripStatus`] and runs
//! the auto-start sweep for trips whose scheduled time has passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::trip::{Trip, TripStatus};
use crate::repositories::TripRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Outcome of one auto-start sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoStartReport {
    pub count: usize,
    pub trip_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct TripLifecycleService {
    trips: Arc<dyn TripRepository>,
}

impl TripLifecycleService {
    pub fn new(trips: Arc<dyn TripRepository>) -> Self {
        Self { trips }
    }

    /// Applies `target` if the trip's current status allows it.
    ///
    /// A rejected transition leaves the store untouched.
    pub async fn advance_status(&self, trip_id: Uuid, target: TripStatus) -> AppResult<Trip> {
        let trip = self
            .trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| not_found_error("Trip", &trip_id))?;

        if !trip.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition {
                from: trip.status,
                to: target,
            });
        }

        let updated = self
            .trips
            .set_status(trip_id, target)
            .await?
            .ok_or_else(|| not_found_error("Trip", &trip_id))?;

        info!("🚚 Trip {} moved {} -> {}", trip_id, trip.status, target);
        Ok(updated)
    }

    /// Starts every `scheduled` trip due at `now`.
    ///
    /// Rows that left `scheduled` between the select and the update are
    /// skipped, so running the sweep again is always safe.
    pub async fn auto_start_due_trips(&self, now: DateTime<Utc>) -> AppResult<AutoStartReport> {
        let due = self.trips.find_due_scheduled(now).await?;
        if due.is_empty() {
            debug!("No scheduled trips due at {}", now);
            return Ok(AutoStartReport::default());
        }

        let started = self.trips.start_scheduled(&due).await?;
        info!(
            "⏱️ Auto-started {} of {} due trips at {}",
            started.len(),
            due.len(),
            now
        );

        Ok(AutoStartReport {
            count: started.len(),
            trip_ids: started,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::NewCustomer;
    use crate::models::profile::Role;
    use crate::models::trip::{NewTrip, TripCharges};
    use crate::models::truck::{NewTruck, TruckStatus};
    use crate::repositories::{CustomerRepository, InMemoryStore, TruckRepository};
    use chrono::Duration;

    async fn trip_at(store: &Arc<InMemoryStore>, scheduled_date: DateTime<Utc>) -> Trip {
        let customer = CustomerRepository::create(
            store.as_ref(),
            NewCustomer {
                name: "Acme".into(),
                contact_person: None,
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();
        let truck = TruckRepository::create(
            store.as_ref(),
            NewTruck {
                plate_number: format!("TR-{}", Uuid::new_v4()),
                model: None,
                capacity: None,
                status: TruckStatus::Active,
                assigned_driver_id: None,
            },
        )
        .await
        .unwrap();
        let driver = store.seed_profile("Dana", Role::Driver).await;

        TripRepository::create(
            store.as_ref(),
            NewTrip {
                customer_id: customer.id,
                driver_id: driver.id,
                truck_id: truck.id,
                origin: "Lyon".into(),
                destination: "Paris".into(),
                scheduled_date,
                distance: None,
                duration: None,
                charges: TripCharges::default(),
            },
        )
        .await
        .unwrap()
    }

    fn service(store: &Arc<InMemoryStore>) -> TripLifecycleService {
        TripLifecycleService::new(store.clone())
    }

    #[tokio::test]
    async fn start_then_complete() {
        let store = Arc::new(InMemoryStore::new());
        let trip = trip_at(&store, Utc::now()).await;
        let service = service(&store);

        let started = service
            .advance_status(trip.id, TripStatus::Ongoing)
            .await
            .unwrap();
        assert_eq!(started.status, TripStatus::Ongoing);
        assert!(started.updated_at >= trip.updated_at);

        let done = service
            .advance_status(trip.id, TripStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, TripStatus::Completed);
    }

    #[tokio::test]
    async fn completed_trip_cannot_restart() {
        let store = Arc::new(InMemoryStore::new());
        let trip = trip_at(&store, Utc::now()).await;
        let service = service(&store);
        service.advance_status(trip.id, TripStatus::Ongoing).await.unwrap();
        let completed = service
            .advance_status(trip.id, TripStatus::Completed)
            .await
            .unwrap();

        let err = service
            .advance_status(trip.id, TripStatus::Ongoing)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: TripStatus::Completed,
                to: TripStatus::Ongoing
            }
        ));

        let stored = TripRepository::find_by_id(store.as_ref(), trip.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, completed);
    }

    #[tokio::test]
    async fn unknown_trip_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store)
            .advance_status(Uuid::new_v4(), TripStatus::Ongoing)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn sweep_starts_only_due_scheduled_trips() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let due = trip_at(&store, now - Duration::hours(1)).await;
        let exactly_now = trip_at(&store, now).await;
        let future = trip_at(&store, now + Duration::hours(1)).await;
        let cancelled = trip_at(&store, now - Duration::hours(2)).await;
        let service = service(&store);
        service
            .advance_status(cancelled.id, TripStatus::Cancelled)
            .await
            .unwrap();

        let report = service.auto_start_due_trips(now).await.unwrap();
        assert_eq!(report.count, 2);
        assert!(report.trip_ids.contains(&due.id));
        assert!(report.trip_ids.contains(&exactly_now.id));

        let status_of = |id| {
            let store = store.clone();
            async move {
                TripRepository::find_by_id(store.as_ref(), id)
                    .await
                    .unwrap()
                    .unwrap()
                    .status
            }
        };
        assert_eq!(status_of(future.id).await, TripStatus::Scheduled);
        assert_eq!(status_of(cancelled.id).await, TripStatus::Cancelled);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        trip_at(&store, now - Duration::minutes(5)).await;
        let service = service(&store);

        assert_eq!(service.auto_start_due_trips(now).await.unwrap().count, 1);
        let second = service.auto_start_due_trips(now).await.unwrap();
        assert_eq!(second, AutoStartReport::default());
    }
}
