//! Maintenance ledger
//!
//! Cost line items recorded against a truck and optionally a trip.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::maintenance::{MaintenanceChanges, MaintenanceItem, NewMaintenanceItem};
use crate::models::report::DateRange;
use crate::repositories::{MaintenanceRepository, TripRepository, TruckRepository};
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::{require_text, validate_cost};

/// A validated line item not yet tied to a truck or trip
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub description: String,
    pub cost: Decimal,
    pub maintenance_date: Option<NaiveDate>,
}

impl MaintenanceDraft {
    pub fn new(description: &str, cost: f64, maintenance_date: Option<NaiveDate>) -> AppResult<Self> {
        Ok(Self {
            description: require_text("description", description)?,
            cost: validate_cost(cost)?,
            maintenance_date,
        })
    }
}

/// Sum of `cost` over the items; zero for none.
pub fn total_cost(items: &[MaintenanceItem]) -> Decimal {
    items.iter().map(|item| item.cost).sum()
}

#[derive(Clone)]
pub struct MaintenanceLedger {
    maintenance: Arc<dyn MaintenanceRepository>,
    trips: Arc<dyn TripRepository>,
    trucks: Arc<dyn TruckRepository>,
}

impl MaintenanceLedger {
    pub fn new(
        maintenance: Arc<dyn MaintenanceRepository>,
        trips: Arc<dyn TripRepository>,
        trucks: Arc<dyn TruckRepository>,
    ) -> Self {
        Self {
            maintenance,
            trips,
            trucks,
        }
    }

    /// Records one item. Without an explicit date it takes the trip's
    /// scheduled date, or today for truck-only items.
    pub async fn add_item(
        &self,
        truck_id: Uuid,
        trip_id: Option<Uuid>,
        draft: MaintenanceDraft,
    ) -> AppResult<MaintenanceItem> {
        if self.trucks.find_by_id(truck_id).await?.is_none() {
            return Err(not_found_error("Truck", &truck_id));
        }

        let default_date = match trip_id {
            Some(id) => self
                .trips
                .find_by_id(id)
                .await?
                .ok_or_else(|| not_found_error("Trip", &id))?
                .scheduled_date
                .date_naive(),
            None => Utc::now().date_naive(),
        };

        let item = self
            .maintenance
            .insert(NewMaintenanceItem {
                truck_id,
                trip_id,
                description: draft.description,
                cost: draft.cost,
                maintenance_date: draft.maintenance_date.unwrap_or(default_date),
            })
            .await?;

        info!("🔧 Maintenance item {} recorded for truck {}", item.id, truck_id);
        Ok(item)
    }

    pub async fn list_for_truck(
        &self,
        truck_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<MaintenanceItem>> {
        range.validate()?;
        self.maintenance.list_for_truck(truck_id, range).await
    }

    pub async fn list_for_trip(&self, trip_id: Uuid) -> AppResult<Vec<MaintenanceItem>> {
        self.maintenance.list_for_trip(trip_id).await
    }

    /// Replaces the trip's items with `drafts` in one atomic store call.
    ///
    /// An empty `drafts` leaves the trip with no items.
    pub async fn replace_for_trip(
        &self,
        trip_id: Uuid,
        truck_id: Uuid,
        drafts: Vec<MaintenanceDraft>,
    ) -> AppResult<Vec<MaintenanceItem>> {
        let trip = self
            .trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| not_found_error("Trip", &trip_id))?;
        let default_date = trip.scheduled_date.date_naive();

        let items = drafts
            .into_iter()
            .map(|draft| NewMaintenanceItem {
                truck_id,
                trip_id: Some(trip_id),
                description: draft.description,
                cost: draft.cost,
                maintenance_date: draft.maintenance_date.unwrap_or(default_date),
            })
            .collect();

        let saved = self.maintenance.replace_for_trip(trip_id, items).await?;
        info!("🔧 Trip {} now has {} maintenance items", trip_id, saved.len());
        Ok(saved)
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        description: Option<&str>,
        cost: Option<f64>,
        maintenance_date: Option<NaiveDate>,
    ) -> AppResult<MaintenanceItem> {
        let changes = MaintenanceChanges {
            description: description
                .map(|d| require_text("description", d))
                .transpose()?,
            cost: cost.map(validate_cost).transpose()?,
            maintenance_date,
        };

        self.maintenance
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Maintenance item", &id))
    }

    pub async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        if !self.maintenance.delete(id).await? {
            return Err(not_found_error("Maintenance item", &id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::NewCustomer;
    use crate::models::profile::Role;
    use crate::models::trip::{NewTrip, Trip, TripCharges};
    use crate::models::truck::{NewTruck, Truck, TruckStatus};
    use crate::repositories::{CustomerRepository, InMemoryStore};
    use crate::utils::errors::AppError;
    use chrono::TimeZone;

    struct Fixture {
        store: Arc<InMemoryStore>,
        ledger: MaintenanceLedger,
        truck: Truck,
        trip: Trip,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let customer = CustomerRepository::create(
            store.as_ref(),
            NewCustomer {
                name: "Globex".into(),
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
                plate_number: "AB-123-CD".into(),
                model: Some("Actros".into()),
                capacity: None,
                status: TruckStatus::Active,
                assigned_driver_id: None,
            },
        )
        .await
        .unwrap();
        let driver = store.seed_profile("Sam", Role::Driver).await;
        let trip = TripRepository::create(
            store.as_ref(),
            NewTrip {
                customer_id: customer.id,
                driver_id: driver.id,
                truck_id: truck.id,
                origin: "Lille".into(),
                destination: "Nantes".into(),
                scheduled_date: Utc.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap(),
                distance: None,
                duration: None,
                charges: TripCharges::default(),
            },
        )
        .await
        .unwrap();

        let ledger = MaintenanceLedger::new(store.clone(), store.clone(), store.clone());
        Fixture {
            store,
            ledger,
            truck,
            trip,
        }
    }

    fn draft(description: &str, cost: f64) -> MaintenanceDraft {
        MaintenanceDraft::new(description, cost, None).unwrap()
    }

    #[test]
    fn drafts_reject_bad_costs() {
        assert!(MaintenanceDraft::new("tyres", -1.0, None).is_err());
        assert!(MaintenanceDraft::new("tyres", f64::NAN, None).is_err());
        assert!(MaintenanceDraft::new("tyres", f64::INFINITY, None).is_err());
        assert!(MaintenanceDraft::new("   ", 10.0, None).is_err());
        assert!(MaintenanceDraft::new("tyres", 0.0, None).is_ok());
    }

    #[test]
    fn total_cost_of_nothing_is_zero() {
        assert_eq!(total_cost(&[]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn trip_items_default_to_the_trip_date() {
        let f = fixture().await;
        let item = f
            .ledger
            .add_item(f.truck.id, Some(f.trip.id), draft("oil change", 45.5))
            .await
            .unwrap();
        assert_eq!(item.maintenance_date, f.trip.scheduled_date.date_naive());
        assert_eq!(item.trip_id, Some(f.trip.id));
    }

    #[tokio::test]
    async fn unknown_truck_is_rejected() {
        let f = fixture().await;
        let err = f
            .ledger
            .add_item(Uuid::new_v4(), None, draft("brakes", 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn truck_history_honours_inclusive_bounds() {
        let f = fixture().await;
        for (day, cost) in [(1, 10.0), (15, 20.0), (31, 30.0)] {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            f.ledger
                .add_item(
                    f.truck.id,
                    None,
                    MaintenanceDraft::new("service", cost, Some(date)).unwrap(),
                )
                .await
                .unwrap();
        }

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 3, 15),
        )
        .unwrap();
        let items = f.ledger.list_for_truck(f.truck.id, range).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].maintenance_date.to_string(), "2024-03-15");

        let all = f
            .ledger
            .list_for_truck(f.truck.id, DateRange::default())
            .await
            .unwrap();
        assert_eq!(total_cost(&all), Decimal::from(60));
    }

    #[tokio::test]
    async fn replace_with_empty_list_clears_the_trip() {
        let f = fixture().await;
        f.ledger
            .replace_for_trip(
                f.trip.id,
                f.truck.id,
                vec![draft("tyres", 100.0), draft("wash", 25.0)],
            )
            .await
            .unwrap();
        assert_eq!(f.ledger.list_for_trip(f.trip.id).await.unwrap().len(), 2);

        let saved = f
            .ledger
            .replace_for_trip(f.trip.id, f.truck.id, Vec::new())
            .await
            .unwrap();
        assert!(saved.is_empty());
        assert!(f.ledger.list_for_trip(f.trip.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_items() {
        let f = fixture().await;
        f.ledger
            .replace_for_trip(f.trip.id, f.truck.id, vec![draft("tyres", 100.0)])
            .await
            .unwrap();

        f.store.fail_maintenance_writes(true);
        let result = f
            .ledger
            .replace_for_trip(f.trip.id, f.truck.id, vec![draft("wash", 25.0)])
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
        f.store.fail_maintenance_writes(false);

        let items = f.ledger.list_for_trip(f.trip.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "tyres");
    }

    #[tokio::test]
    async fn update_and_delete_single_items() {
        let f = fixture().await;
        let item = f
            .ledger
            .add_item(f.truck.id, None, draft("filters", 30.0))
            .await
            .unwrap();

        let updated = f
            .ledger
            .update_item(item.id, None, Some(35.0), None)
            .await
            .unwrap();
        assert_eq!(updated.cost, Decimal::from(35));
        assert_eq!(updated.description, "filters");

        assert!(f.ledger.update_item(item.id, None, Some(-5.0), None).await.is_err());

        f.ledger.delete_item(item.id).await.unwrap();
        assert!(matches!(
            f.ledger.delete_item(item.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
