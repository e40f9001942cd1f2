//! Report generator
//!
//! Reads joined rows for one entity, folds maintenance costs and profit into
//! trip rows, and hands back a row set that renders to JSON or CSV.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::models::maintenance::MaintenanceItem;
use crate::models::report::{
    CustomerReportRow, DateRange, ReportEntity, ReportFilters, TripReportFilters, TripReportRow,
    TripReportSource, TruckReportRow,
};
use crate::models::trip::TripCharges;
use crate::repositories::{MaintenanceRepository, ReportRepository};
use crate::services::csv_export::to_csv;
use crate::services::profit_aggregator::compute_profit;
use crate::utils::errors::{AppError, AppResult};

/// Rows of one report, newest first
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    Trips(Vec<TripReportRow>),
    Customers(Vec<CustomerReportRow>),
    Trucks(Vec<TruckReportRow>),
}

impl ReportRows {
    pub fn entity(&self) -> ReportEntity {
        match self {
            ReportRows::Trips(_) => ReportEntity::Trips,
            ReportRows::Customers(_) => ReportEntity::Customers,
            ReportRows::Trucks(_) => ReportEntity::Trucks,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReportRows::Trips(rows) => rows.len(),
            ReportRows::Customers(rows) => rows.len(),
            ReportRows::Trucks(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON array of rows.
    pub fn to_json(&self) -> AppResult<serde_json::Value> {
        let value = match self {
            ReportRows::Trips(rows) => serde_json::to_value(rows),
            ReportRows::Customers(rows) => serde_json::to_value(rows),
            ReportRows::Trucks(rows) => serde_json::to_value(rows),
        };
        value.map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))
    }

    pub fn to_csv(&self) -> AppResult<String> {
        match self {
            ReportRows::Trips(rows) => to_csv(rows),
            ReportRows::Customers(rows) => to_csv(rows),
            ReportRows::Trucks(rows) => to_csv(rows),
        }
    }
}

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    maintenance: Arc<dyn MaintenanceRepository>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        maintenance: Arc<dyn MaintenanceRepository>,
    ) -> Self {
        Self {
            reports,
            maintenance,
        }
    }

    pub async fn generate(&self, range: DateRange, filters: &ReportFilters) -> AppResult<ReportRows> {
        range.validate()?;

        let rows = match filters {
            ReportFilters::Trips(f) => ReportRows::Trips(self.trip_rows(range, f).await?),
            ReportFilters::Customers(f) => {
                let mut rows: Vec<CustomerReportRow> = self
                    .reports
                    .customer_rows(range, f)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                ReportRows::Customers(rows)
            }
            ReportFilters::Trucks(f) => {
                let mut rows: Vec<TruckReportRow> = self
                    .reports
                    .truck_rows(range, f)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                ReportRows::Trucks(rows)
            }
        };

        info!("📊 {} report generated with {} rows", rows.entity(), rows.len());
        Ok(rows)
    }

    async fn trip_rows(
        &self,
        range: DateRange,
        filters: &TripReportFilters,
    ) -> AppResult<Vec<TripReportRow>> {
        let sources = self.reports.trip_rows(range, filters).await?;
        let ids: Vec<Uuid> = sources.iter().map(|s| s.id).collect();

        let mut by_trip: HashMap<Uuid, Vec<MaintenanceItem>> = HashMap::new();
        for item in self.maintenance.list_for_trips(&ids).await? {
            if let Some(trip_id) = item.trip_id {
                by_trip.entry(trip_id).or_default().push(item);
            }
        }

        let mut rows: Vec<TripReportRow> = sources
            .into_iter()
            .map(|source| {
                let items = by_trip.get(&source.id).map(Vec::as_slice).unwrap_or(&[]);
                trip_row(source, items, filters)
            })
            .collect();
        rows.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(rows)
    }
}

fn trip_row(
    source: TripReportSource,
    maintenance: &[MaintenanceItem],
    filters: &TripReportFilters,
) -> TripReportRow {
    let charges = TripCharges {
        rate: source.rate,
        fuel: source.fuel,
        mileage: source.mileage,
        salary: source.salary,
        road_tolls: source.road_tolls,
    };
    let profit = compute_profit(&charges, maintenance, filters.include_road_tolls.into());

    TripReportRow {
        id: source.id,
        scheduled_date: source.scheduled_date,
        customer_name: source.customer_name,
        truck_plate: source.truck_plate,
        truck_model: source.truck_model,
        driver_name: source.driver_name,
        origin: source.origin,
        destination: source.destination,
        status: source.status,
        distance: source.distance,
        rate: profit.rate,
        fuel: profit.fuel,
        mileage: profit.mileage,
        salary: profit.salary,
        road_tolls: profit.road_tolls,
        maintenance_cost: profit.maintenance_cost,
        total_costs: profit.total_costs,
        profit: profit.profit,
        profit_margin: profit.profit_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::NewCustomer;
    use crate::models::maintenance::NewMaintenanceItem;
    use crate::models::profile::Role;
    use crate::models::report::{ReportRow, TruckReportFilters};
    use crate::models::trip::{NewTrip, TripStatus};
    use crate::models::truck::{NewTruck, TruckStatus};
    use crate::repositories::{CustomerRepository, InMemoryStore, TripRepository, TruckRepository};
    use crate::services::csv_export::cell_text;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    async fn seeded() -> (Arc<InMemoryStore>, ReportService) {
        let store = Arc::new(InMemoryStore::new());
        let customer = CustomerRepository::create(
            store.as_ref(),
            NewCustomer {
                name: "Initech, Ltd".into(),
                contact_person: Some("Bill".into()),
                email: None,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap();
        let driver = store.seed_profile("Peter \"Pete\" Gibbons", Role::Driver).await;
        let truck = TruckRepository::create(
            store.as_ref(),
            NewTruck {
                plate_number: "ZX-900".into(),
                model: Some("FH16".into()),
                capacity: Some(Decimal::from(40)),
                status: TruckStatus::Active,
                assigned_driver_id: Some(driver.id),
            },
        )
        .await
        .unwrap();

        for (day, rate) in [(3, 1000), (10, 800), (20, 0)] {
            let trip = TripRepository::create(
                store.as_ref(),
                NewTrip {
                    customer_id: customer.id,
                    driver_id: driver.id,
                    truck_id: truck.id,
                    origin: "Austin".into(),
                    destination: "Dallas".into(),
                    scheduled_date: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
                    distance: Some(Decimal::new(3152, 1)),
                    duration: Some("3h".into()),
                    charges: TripCharges {
                        rate: Some(Decimal::from(rate)),
                        fuel: Some(Decimal::from(200)),
                        mileage: Some(Decimal::from(50)),
                        salary: Some(Decimal::from(300)),
                        road_tolls: Some(Decimal::from(20)),
                    },
                },
            )
            .await
            .unwrap();
            MaintenanceRepository::insert(
                store.as_ref(),
                NewMaintenanceItem {
                    truck_id: truck.id,
                    trip_id: Some(trip.id),
                    description: "tyres".into(),
                    cost: Decimal::from(75),
                    maintenance_date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
                },
            )
            .await
            .unwrap();
        }

        let service = ReportService::new(store.clone(), store.clone());
        (store, service)
    }

    fn june(from: u32, to: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, from),
            NaiveDate::from_ymd_opt(2024, 6, to),
        )
        .unwrap()
    }

    fn parse_csv(body: &str) -> Vec<Vec<String>> {
        body.lines()
            .skip(1)
            .map(|line| {
                let mut cells = Vec::new();
                let mut current = String::new();
                let mut in_quotes = false;
                let mut chars = line.chars().peekable();
                while let Some(c) = chars.next() {
                    match (c, in_quotes) {
                        ('"', true) if chars.peek() == Some(&'"') => {
                            current.push('"');
                            chars.next();
                        }
                        ('"', _) => in_quotes = !in_quotes,
                        (',', false) => cells.push(std::mem::take(&mut current)),
                        (c, _) => current.push(c),
                    }
                }
                cells.push(current);
                cells
            })
            .collect()
    }

    fn assert_parity<R: ReportRow>(rows: &[R], csv: &str) {
        let json = serde_json::to_value(rows).unwrap();
        let parsed = parse_csv(csv);
        assert_eq!(parsed.len(), rows.len());
        for (json_row, csv_row) in json.as_array().unwrap().iter().zip(parsed) {
            let expected: Vec<String> = R::COLUMNS
                .iter()
                .map(|c| cell_text(&json_row[*c]))
                .collect();
            assert_eq!(expected, csv_row);
        }
    }

    #[tokio::test]
    async fn trip_rows_carry_profit_and_are_newest_first() {
        let (_store, service) = seeded().await;
        let rows = service
            .generate(june(1, 30), &ReportFilters::Trips(TripReportFilters::default()))
            .await
            .unwrap();

        let ReportRows::Trips(rows) = rows else {
            panic!("expected trip rows");
        };
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].scheduled_date >= w[1].scheduled_date));

        let oldest = rows.last().unwrap();
        assert_eq!(oldest.total_costs, Decimal::from(645));
        assert_eq!(oldest.profit, Decimal::from(355));
        assert_eq!(oldest.profit_margin, Decimal::new(355, 1));
        assert_eq!(oldest.customer_name.as_deref(), Some("Initech, Ltd"));
        assert_eq!(oldest.truck_plate.as_deref(), Some("ZX-900"));

        let zero_rate = &rows[0];
        assert_eq!(zero_rate.profit_margin, Decimal::ZERO);
    }

    #[tokio::test]
    async fn road_tolls_can_be_left_out() {
        let (_store, service) = seeded().await;
        let filters = ReportFilters::parse(
            ReportEntity::Trips,
            json!({ "include_road_tolls": false }),
        )
        .unwrap();
        let ReportRows::Trips(rows) = service.generate(june(3, 3), &filters).await.unwrap() else {
            panic!("expected trip rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_costs, Decimal::from(625));
        assert_eq!(rows[0].road_tolls, None);
    }

    #[tokio::test]
    async fn status_filter_and_empty_results() {
        let (_store, service) = seeded().await;
        let filters = ReportFilters::Trips(TripReportFilters {
            status: Some(TripStatus::Completed),
            ..Default::default()
        });
        let rows = service.generate(june(1, 30), &filters).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(rows.to_json().unwrap(), json!([]));
        assert_eq!(rows.to_csv().unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn json_and_csv_agree() {
        let (_store, service) = seeded().await;
        let ranges = [june(1, 30), june(4, 19), DateRange::default()];
        for range in ranges {
            for filters in [
                ReportFilters::Trips(TripReportFilters::default()),
                ReportFilters::Customers(Default::default()),
                ReportFilters::Trucks(TruckReportFilters::default()),
            ] {
                let rows = service.generate(range, &filters).await.unwrap();
                let csv = rows.to_csv().unwrap();
                match &rows {
                    ReportRows::Trips(r) => assert_parity(r, &csv),
                    ReportRows::Customers(r) => assert_parity(r, &csv),
                    ReportRows::Trucks(r) => assert_parity(r, &csv),
                }
            }
        }
    }

    #[tokio::test]
    async fn customer_and_truck_ranges_include_both_end_days() {
        let (store, service) = seeded().await;
        let edges = [
            ("before", Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap()),
            ("first", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            ("last", Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap()),
            ("after", Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()),
        ];
        for (label, created_at) in edges {
            let customer = CustomerRepository::create(
                store.as_ref(),
                NewCustomer {
                    name: label.into(),
                    contact_person: None,
                    email: None,
                    phone: None,
                    address: None,
                },
            )
            .await
            .unwrap();
            store.backdate_customer(customer.id, created_at).await;

            let truck = TruckRepository::create(
                store.as_ref(),
                NewTruck {
                    plate_number: label.to_uppercase(),
                    model: None,
                    capacity: None,
                    status: TruckStatus::Active,
                    assigned_driver_id: None,
                },
            )
            .await
            .unwrap();
            store.backdate_truck(truck.id, created_at).await;
        }

        let rows = service
            .generate(june(1, 30), &ReportFilters::Customers(Default::default()))
            .await
            .unwrap();
        let csv = rows.to_csv().unwrap();
        let ReportRows::Customers(customers) = rows else {
            panic!("expected customer rows");
        };
        let names: Vec<&str> = customers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["last", "first"]);
        assert_parity(&customers, &csv);

        let rows = service
            .generate(june(1, 30), &ReportFilters::Trucks(Default::default()))
            .await
            .unwrap();
        let csv = rows.to_csv().unwrap();
        let ReportRows::Trucks(trucks) = rows else {
            panic!("expected truck rows");
        };
        let plates: Vec<&str> = trucks.iter().map(|r| r.plate_number.as_str()).collect();
        assert_eq!(plates, ["LAST", "FIRST"]);
        assert_parity(&trucks, &csv);

        let ReportRows::Customers(single_day) = service
            .generate(june(30, 30), &ReportFilters::Customers(Default::default()))
            .await
            .unwrap()
        else {
            panic!("expected customer rows");
        };
        assert_eq!(single_day.len(), 1);
        assert_eq!(single_day[0].name, "last");
    }

    #[tokio::test]
    async fn truck_rows_join_driver_and_trip_count() {
        let (_store, service) = seeded().await;
        let ReportRows::Trucks(rows) = service
            .generate(DateRange::default(), &ReportFilters::Trucks(Default::default()))
            .await
            .unwrap()
        else {
            panic!("expected truck rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trip_count, 3);
        assert_eq!(rows[0].driver_name.as_deref(), Some("Peter \"Pete\" Gibbons"));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let (_store, service) = seeded().await;
        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2024, 7, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 1),
        };
        let err = service
            .generate(range, &ReportFilters::Customers(Default::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
