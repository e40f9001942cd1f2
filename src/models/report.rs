//! Report model
//!
//! Date ranges, the per-entity filter structures accepted by the report
//! generator, the joined rows read from the store and the flattened rows
//! returned to callers. Nothing here is persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::trip::TripStatus;
use super::truck::TruckStatus;
use super::UnknownVariant;
use crate::utils::errors::{AppError, AppResult};

/// Inclusive calendar-date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<Self> {
        let range = Self { from, to };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::InvalidInput(format!(
                    "Date range start {} is after its end {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.contains(instant.date_naive())
    }
}

/// Entity a report is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportEntity {
    Trips,
    Customers,
    Trucks,
}

impl ReportEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportEntity::Trips => "trips",
            ReportEntity::Customers => "customers",
            ReportEntity::Trucks => "trucks",
        }
    }
}

impl fmt::Display for ReportEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportEntity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trips" => Ok(ReportEntity::Trips),
            "customers" => Ok(ReportEntity::Customers),
            "trucks" => Ok(ReportEntity::Trucks),
            other => Err(UnknownVariant {
                kind: "report entity",
                value: other.to_string(),
            }),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Filters accepted by the trips report
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TripReportFilters {
    pub status: Option<TripStatus>,
    pub customer_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    /// Whether `ROAD TOLLS` counts towards total costs.
    #[serde(default = "default_true")]
    pub include_road_tolls: bool,
}

impl Default for TripReportFilters {
    fn default() -> Self {
        Self {
            status: None,
            customer_id: None,
            truck_id: None,
            driver_id: None,
            include_road_tolls: true,
        }
    }
}

/// Filters accepted by the customers report
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerReportFilters {}

/// Filters accepted by the trucks report
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TruckReportFilters {
    pub status: Option<TruckStatus>,
    pub assigned_driver_id: Option<Uuid>,
}

/// Typed filter set, one variant per report entity
#[derive(Debug, Clone, PartialEq)]
pub enum ReportFilters {
    Trips(TripReportFilters),
    Customers(CustomerReportFilters),
    Trucks(TruckReportFilters),
}

impl ReportFilters {
    /// Parses a loosely-typed filter object for the given entity.
    ///
    /// `null` means no filters; unknown keys are rejected.
    pub fn parse(entity: ReportEntity, raw: serde_json::Value) -> AppResult<Self> {
        let raw = if raw.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            raw
        };
        let invalid = |e: serde_json::Error| {
            AppError::InvalidInput(format!("Invalid {} report filters: {}", entity, e))
        };
        Ok(match entity {
            ReportEntity::Trips => {
                ReportFilters::Trips(serde_json::from_value(raw).map_err(invalid)?)
            }
            ReportEntity::Customers => {
                ReportFilters::Customers(serde_json::from_value(raw).map_err(invalid)?)
            }
            ReportEntity::Trucks => {
                ReportFilters::Trucks(serde_json::from_value(raw).map_err(invalid)?)
            }
        })
    }

    pub fn entity(&self) -> ReportEntity {
        match self {
            ReportFilters::Trips(_) => ReportEntity::Trips,
            ReportFilters::Customers(_) => ReportEntity::Customers,
            ReportFilters::Trucks(_) => ReportEntity::Trucks,
        }
    }
}

/// Whether `ROAD TOLLS` is part of a trip's total costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadTolls {
    Include,
    Exclude,
}

impl From<bool> for RoadTolls {
    fn from(include: bool) -> Self {
        if include {
            RoadTolls::Include
        } else {
            RoadTolls::Exclude
        }
    }
}

/// Derived profit record for one trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripProfit {
    pub rate: Decimal,
    pub fuel: Decimal,
    pub mileage: Decimal,
    pub salary: Decimal,
    /// `None` when road tolls were excluded from the computation.
    pub road_tolls: Option<Decimal>,
    pub maintenance_cost: Decimal,
    pub total_costs: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
}

/// Trip joined with its customer, truck and driver names
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct TripReportSource {
    pub id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub status: TripStatus,
    pub origin: String,
    pub destination: String,
    pub distance: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub fuel: Option<Decimal>,
    pub mileage: Option<Decimal>,
    pub salary: Option<Decimal>,
    pub road_tolls: Option<Decimal>,
    pub customer_name: Option<String>,
    pub truck_plate: Option<String>,
    pub truck_model: Option<String>,
    pub driver_name: Option<String>,
}

/// Customer with the number of trips booked for it
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CustomerReportSource {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub trip_count: i64,
}

/// Truck with its driver's name and trip count
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct TruckReportSource {
    pub id: Uuid,
    pub plate_number: String,
    pub model: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: TruckStatus,
    pub driver_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub trip_count: i64,
}

/// A flattened report row; `COLUMNS` are its JSON keys in CSV order.
pub trait ReportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripReportRow {
    pub id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub truck_plate: Option<String>,
    pub truck_model: Option<String>,
    pub driver_name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub status: TripStatus,
    pub distance: Option<Decimal>,
    pub rate: Decimal,
    pub fuel: Decimal,
    pub mileage: Decimal,
    pub salary: Decimal,
    pub road_tolls: Option<Decimal>,
    pub maintenance_cost: Decimal,
    pub total_costs: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
}

impl ReportRow for TripReportRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "scheduled_date",
        "customer_name",
        "truck_plate",
        "truck_model",
        "driver_name",
        "origin",
        "destination",
        "status",
        "distance",
        "rate",
        "fuel",
        "mileage",
        "salary",
        "road_tolls",
        "maintenance_cost",
        "total_costs",
        "profit",
        "profit_margin",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReportRow {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub trip_count: i64,
}

impl ReportRow for CustomerReportRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "contact_person",
        "email",
        "phone",
        "address",
        "created_at",
        "trip_count",
    ];
}

impl From<CustomerReportSource> for CustomerReportRow {
    fn from(source: CustomerReportSource) -> Self {
        Self {
            id: source.id,
            name: source.name,
            contact_person: source.contact_person,
            email: source.email,
            phone: source.phone,
            address: source.address,
            created_at: source.created_at,
            trip_count: source.trip_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckReportRow {
    pub id: Uuid,
    pub plate_number: String,
    pub model: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: TruckStatus,
    pub driver_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub trip_count: i64,
}

impl ReportRow for TruckReportRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "plate_number",
        "model",
        "capacity",
        "status",
        "driver_name",
        "created_at",
        "trip_count",
    ];
}

impl From<TruckReportSource> for TruckReportRow {
    fn from(source: TruckReportSource) -> Self {
        Self {
            id: source.id,
            plate_number: source.plate_number,
            model: source.model,
            capacity: source.capacity,
            status: source.status,
            driver_name: source.driver_name,
            created_at: source.created_at,
            trip_count: source.trip_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let range = DateRange::new(Some(date("2024-03-01")), Some(date("2024-03-31"))).unwrap();
        assert!(range.contains(date("2024-03-01")));
        assert!(range.contains(date("2024-03-31")));
        assert!(!range.contains(date("2024-02-29")));
        assert!(!range.contains(date("2024-04-01")));
        assert!(DateRange::default().contains(date("1999-01-01")));
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(Some(date("2024-04-01")), Some(date("2024-03-01"))).is_err());
    }

    #[test]
    fn trip_filters_default_to_including_road_tolls() {
        let filters = ReportFilters::parse(ReportEntity::Trips, serde_json::Value::Null).unwrap();
        assert_eq!(filters, ReportFilters::Trips(TripReportFilters::default()));

        let filters =
            ReportFilters::parse(ReportEntity::Trips, json!({ "status": "completed" })).unwrap();
        match filters {
            ReportFilters::Trips(f) => {
                assert_eq!(f.status, Some(TripStatus::Completed));
                assert!(f.include_road_tolls);
            }
            other => panic!("unexpected filters {:?}", other),
        }
    }

    #[test]
    fn trip_status_filter_accepts_legacy_spelling() {
        let filters =
            ReportFilters::parse(ReportEntity::Trips, json!({ "status": "in progress" })).unwrap();
        match filters {
            ReportFilters::Trips(f) => assert_eq!(f.status, Some(TripStatus::Ongoing)),
            other => panic!("unexpected filters {:?}", other),
        }
    }

    #[test]
    fn filters_reject_keys_of_other_entities() {
        let err = ReportFilters::parse(ReportEntity::Customers, json!({ "status": "active" }));
        assert!(matches!(err, Err(AppError::InvalidInput(_))));

        let ok = ReportFilters::parse(ReportEntity::Trucks, json!({ "status": "maintenance" }));
        assert_eq!(
            ok.unwrap(),
            ReportFilters::Trucks(TruckReportFilters {
                status: Some(TruckStatus::Maintenance),
                assigned_driver_id: None,
            })
        );
    }

    #[test]
    fn report_entity_round_trips_through_str() {
        for entity in [ReportEntity::Trips, ReportEntity::Customers, ReportEntity::Trucks] {
            assert_eq!(entity.as_str().parse::<ReportEntity>().unwrap(), entity);
        }
        assert!("drivers".parse::<ReportEntity>().is_err());
    }
}
