//! Repository tests against an embedded PostgreSQL cluster.
//!
//! Each test gets a fresh database with the migrations applied. Set
//! `SKIP_TEST_CLUSTER=1` to skip them where the cluster cannot start.

use std::future::Future;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::runtime::Runtime;
use uuid::Uuid;

use triptrac::config::DatabaseConfig;
use triptrac::models::customer::{Customer, NewCustomer};
use triptrac::models::maintenance::NewMaintenanceItem;
use triptrac::models::otp::NewOtp;
use triptrac::models::profile::{NewAccount, Profile, Role};
use triptrac::models::report::{
    CustomerReportFilters, DateRange, TripReportFilters, TruckReportFilters,
};
use triptrac::models::trip::{NewTrip, Trip, TripCharges, TripFilters, TripStatus};
use triptrac::models::truck::{NewTruck, Truck, TruckStatus};
use triptrac::repositories::{
    AccountRepository, CustomerRepository, MaintenanceRepository, OtpRepository,
    PgAccountRepository, PgCustomerRepository, PgMaintenanceRepository, PgOtpRepository,
    PgReportRepository, PgTripRepository, PgTruckRepository, ReportRepository, TripRepository,
    TruckRepository,
};

static CLUSTER_BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn test_cluster() -> Option<TestCluster> {
    let _guard = CLUSTER_BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    match TestCluster::new() {
        Ok(cluster) => Some(cluster),
        Err(err) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {err:?}");
            None
        }
        Err(err) => panic!("Test cluster setup failed: {err:?}. Set SKIP_TEST_CLUSTER=1 to skip."),
    }
}

/// Runs `test` against a migrated scratch database.
///
/// The pool holds a single connection so session settings made by a test
/// apply to every query it runs.
fn with_database<F, Fut>(test: F)
where
    F: FnOnce(PgPool) -> Fut,
    Fut: Future<Output = ()>,
{
    let Some(cluster) = test_cluster() else {
        return;
    };
    let name = format!("triptrac_{}", Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .expect("scratch database should be created");
    let runtime = Runtime::new().expect("tokio runtime should start");

    runtime.block_on(async {
        let config = DatabaseConfig {
            max_connections: 1,
            min_connections: 0,
            ..DatabaseConfig::new(database.url().to_string())
        };
        let pool = config.create_pool().await.expect("pool should connect");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations should apply");

        test(pool.clone()).await;
        pool.close().await;
    });

    drop(database);
}

struct Fleet {
    customer: Customer,
    driver: Profile,
    truck: Truck,
}

async fn fleet(pool: &PgPool) -> Fleet {
    let driver = PgAccountRepository::new(pool.clone())
        .create_account(NewAccount {
            email: format!("{}@triptrac.test", Uuid::new_v4().simple()),
            password_hash: "$2b$04$placeholder".to_string(),
            name: "Dana Driver".to_string(),
            phone: None,
            role: Role::Driver,
        })
        .await
        .unwrap();
    let customer = PgCustomerRepository::new(pool.clone())
        .create(NewCustomer {
            name: "Acme Freight".to_string(),
            contact_person: None,
            email: None,
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    let truck = PgTruckRepository::new(pool.clone())
        .create(NewTruck {
            plate_number: format!("PG-{}", &Uuid::new_v4().simple().to_string()[..6]),
            model: Some("Volvo FH".to_string()),
            capacity: Some(Decimal::from(24)),
            status: TruckStatus::Active,
            assigned_driver_id: Some(driver.id),
        })
        .await
        .unwrap();
    Fleet {
        customer,
        driver,
        truck,
    }
}

async fn trip_at(pool: &PgPool, fleet: &Fleet, scheduled_date: DateTime<Utc>) -> Trip {
    PgTripRepository::new(pool.clone())
        .create(NewTrip {
            customer_id: fleet.customer.id,
            driver_id: fleet.driver.id,
            truck_id: fleet.truck.id,
            origin: "Lyon".to_string(),
            destination: "Marseille".to_string(),
            scheduled_date,
            distance: Some(Decimal::new(3150, 1)),
            duration: Some("3h30".to_string()),
            charges: TripCharges {
                rate: Some(Decimal::from(1000)),
                fuel: Some(Decimal::from(200)),
                mileage: Some(Decimal::from(50)),
                salary: Some(Decimal::from(300)),
                road_tolls: Some(Decimal::new(1250, 2)),
            },
        })
        .await
        .unwrap()
}

fn item(truck_id: Uuid, trip_id: Uuid, description: &str, cost: i64) -> NewMaintenanceItem {
    NewMaintenanceItem {
        truck_id,
        trip_id: Some(trip_id),
        description: description.to_string(),
        cost: Decimal::from(cost),
        maintenance_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    }
}

fn june() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 6, 1),
        NaiveDate::from_ymd_opt(2024, 6, 30),
    )
    .unwrap()
}

#[test]
fn quoted_charge_columns_round_trip() {
    with_database(|pool| async move {
        let fleet = fleet(&pool).await;
        let created = trip_at(&pool, &fleet, Utc::now() + Duration::days(1)).await;

        let stored = PgTripRepository::new(pool.clone())
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TripStatus::Scheduled);
        assert_eq!(stored.road_tolls, Some(Decimal::new(1250, 2)));
        assert_eq!(stored.charges(), created.charges());
    });
}

#[test]
fn legacy_in_progress_rows_match_ongoing_filters() {
    with_database(|pool| async move {
        let fleet = fleet(&pool).await;
        let legacy = trip_at(&pool, &fleet, Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap()).await;
        trip_at(&pool, &fleet, Utc.with_ymd_and_hms(2024, 6, 11, 8, 0, 0).unwrap()).await;
        sqlx::query("UPDATE trips SET status = 'In Progress' WHERE id = $1")
            .bind(legacy.id)
            .execute(&pool)
            .await
            .unwrap();

        let trips = PgTripRepository::new(pool.clone())
            .list(&TripFilters {
                status: Some(TripStatus::Ongoing),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, legacy.id);
        assert_eq!(trips[0].status, TripStatus::Ongoing);

        let rows = PgReportRepository::new(pool.clone())
            .trip_rows(
                june(),
                &TripReportFilters {
                    status: Some(TripStatus::Ongoing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, legacy.id);
    });
}

#[test]
fn auto_start_moves_each_due_trip_once() {
    with_database(|pool| async move {
        let fleet = fleet(&pool).await;
        let now = Utc::now();
        let first = trip_at(&pool, &fleet, now - Duration::hours(2)).await;
        let second = trip_at(&pool, &fleet, now - Duration::minutes(5)).await;
        let later = trip_at(&pool, &fleet, now + Duration::days(1)).await;
        let trips = PgTripRepository::new(pool.clone());

        let due = trips.find_due_scheduled(now).await.unwrap();
        assert_eq!(due, vec![first.id, second.id]);

        let mut started = trips.start_scheduled(&due).await.unwrap();
        started.sort();
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(started, expected);

        assert!(trips.start_scheduled(&due).await.unwrap().is_empty());
        assert!(trips.find_due_scheduled(now).await.unwrap().is_empty());

        let untouched = trips.find_by_id(later.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, TripStatus::Scheduled);
    });
}

#[test]
fn maintenance_replacement_is_all_or_nothing() {
    with_database(|pool| async move {
        let fleet = fleet(&pool).await;
        let trip = trip_at(&pool, &fleet, Utc::now() + Duration::days(1)).await;
        let maintenance = PgMaintenanceRepository::new(pool.clone());

        maintenance
            .replace_for_trip(
                trip.id,
                vec![
                    item(fleet.truck.id, trip.id, "Oil change", 120),
                    item(fleet.truck.id, trip.id, "Tyres", 480),
                ],
            )
            .await
            .unwrap();

        let rejected = maintenance
            .replace_for_trip(
                trip.id,
                vec![
                    item(fleet.truck.id, trip.id, "Brake pads", 75),
                    item(fleet.truck.id, trip.id, "Refund", -10),
                ],
            )
            .await;
        assert!(rejected.is_err());

        let mut kept: Vec<String> = maintenance
            .list_for_trip(trip.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.description)
            .collect();
        kept.sort();
        assert_eq!(kept, ["Oil change", "Tyres"]);

        let cleared = maintenance.replace_for_trip(trip.id, Vec::new()).await.unwrap();
        assert!(cleared.is_empty());
        assert!(maintenance.list_for_trip(trip.id).await.unwrap().is_empty());
    });
}

#[test]
fn report_date_bounds_use_utc_days_whatever_the_session_zone() {
    with_database(|pool| async move {
        let fleet = fleet(&pool).await;
        sqlx::query("SET TIME ZONE 'Pacific/Kiritimati'")
            .execute(&pool)
            .await
            .unwrap();

        // 14h ahead of UTC: both instants fall on the neighbouring local day.
        let before = Utc.with_ymd_and_hms(2024, 5, 31, 11, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let early = trip_at(&pool, &fleet, before).await;
        let late = trip_at(&pool, &fleet, last).await;
        sqlx::query("UPDATE customers SET created_at = $1 WHERE id = $2")
            .bind(last)
            .bind(fleet.customer.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE trucks SET created_at = $1 WHERE id = $2")
            .bind(before)
            .bind(fleet.truck.id)
            .execute(&pool)
            .await
            .unwrap();

        let reports = PgReportRepository::new(pool.clone());
        let trips = reports
            .trip_rows(june(), &TripReportFilters::default())
            .await
            .unwrap();
        let ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![late.id]);
        assert!(!ids.contains(&early.id));

        let customers = reports
            .customer_rows(june(), &CustomerReportFilters::default())
            .await
            .unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].trip_count, 2);

        let trucks = reports
            .truck_rows(june(), &TruckReportFilters::default())
            .await
            .unwrap();
        assert!(trucks.is_empty());
    });
}

#[test]
fn released_code_can_be_verified_again() {
    with_database(|pool| async move {
        let otps = PgOtpRepository::new(pool.clone());
        let now = Utc::now();
        let record = otps
            .insert(NewOtp {
                email: "retry@triptrac.test".to_string(),
                code: "482913".to_string(),
                expires_at: now + Duration::minutes(10),
                user_data: None,
            })
            .await
            .unwrap();

        assert!(otps.mark_verified(record.id).await.unwrap());
        assert!(otps
            .find_live("retry@triptrac.test", "482913", now)
            .await
            .unwrap()
            .is_none());

        otps.release(record.id).await.unwrap();
        let live = otps
            .find_live("retry@triptrac.test", "482913", now)
            .await
            .unwrap();
        assert_eq!(live.map(|r| r.id), Some(record.id));
        assert!(otps.mark_verified(record.id).await.unwrap());
    });
}
