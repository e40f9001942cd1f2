//! Trip model
//!
//! A trip maps to the `trips` table, including its historically capitalised
//! monetary columns (`"RATE"`, `"FUEL"`, `"MILEAGE"`, `"SALARY"`,
//! `"ROAD TOLLS"`). The status machine lives here as well.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

/// Status of a trip.
///
/// `scheduled -> ongoing -> completed`, `ongoing -> scheduled` (pause) and
/// `cancelled` from any non-terminal state. `completed` and `cancelled` are
/// terminal.
///
/// Deserializes through [`FromStr`], so request bodies and query strings
/// accept the same spellings as stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TripStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

/// Legacy spelling of `ongoing` still present in older rows.
pub const LEGACY_ONGOING_ALIAS: &str = "in progress";

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Scheduled,
        TripStatus::Ongoing,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Ongoing => "ongoing",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    /// The single transition table for trips.
    pub fn can_transition_to(&self, target: TripStatus) -> bool {
        use TripStatus::*;
        matches!(
            (self, target),
            (Scheduled, Ongoing)
                | (Ongoing, Completed)
                | (Ongoing, Scheduled)
                | (Scheduled, Cancelled)
                | (Ongoing, Cancelled)
        )
    }

    /// Every stored spelling that means this status, lowercased.
    ///
    /// Used when filtering rows in SQL so legacy rows are not missed.
    pub fn stored_spellings(&self) -> Vec<String> {
        let mut spellings = vec![self.as_str().to_string()];
        if *self == TripStatus::Ongoing {
            spellings.push(LEGACY_ONGOING_ALIAS.to_string());
        }
        spellings
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = UnknownVariant;

    /// Case-insensitive; accepts the legacy `in progress` alias as `ongoing`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(TripStatus::Scheduled),
            "ongoing" | LEGACY_ONGOING_ALIAS => Ok(TripStatus::Ongoing),
            "completed" => Ok(TripStatus::Completed),
            "cancelled" => Ok(TripStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "trip status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TripStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

super::text_column_enum!(TripStatus);

/// Trip row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub driver_id: Uuid,
    pub truck_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub scheduled_date: DateTime<Utc>,
    pub distance: Option<Decimal>,
    pub duration: Option<String>,
    #[sqlx(rename = "RATE")]
    pub rate: Option<Decimal>,
    #[sqlx(rename = "FUEL")]
    pub fuel: Option<Decimal>,
    #[sqlx(rename = "MILEAGE")]
    pub mileage: Option<Decimal>,
    #[sqlx(rename = "SALARY")]
    pub salary: Option<Decimal>,
    #[sqlx(rename = "ROAD TOLLS")]
    pub road_tolls: Option<Decimal>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Monetary fields of a trip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripCharges {
    pub rate: Option<Decimal>,
    pub fuel: Option<Decimal>,
    pub mileage: Option<Decimal>,
    pub salary: Option<Decimal>,
    pub road_tolls: Option<Decimal>,
}

impl Trip {
    pub fn charges(&self) -> TripCharges {
        TripCharges {
            rate: self.rate,
            fuel: self.fuel,
            mileage: self.mileage,
            salary: self.salary,
            road_tolls: self.road_tolls,
        }
    }
}

/// Validated data for inserting a trip. New trips always start `scheduled`.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub customer_id: Uuid,
    pub driver_id: Uuid,
    pub truck_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub scheduled_date: DateTime<Utc>,
    pub distance: Option<Decimal>,
    pub duration: Option<String>,
    pub charges: TripCharges,
}

/// Validated field edits; `None` keeps the current value.
///
/// Status is deliberately absent: it only moves through the lifecycle service.
#[derive(Debug, Clone, Default)]
pub struct TripChanges {
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub distance: Option<Decimal>,
    pub duration: Option<String>,
    pub rate: Option<Decimal>,
    pub fuel: Option<Decimal>,
    pub mileage: Option<Decimal>,
    pub salary: Option<Decimal>,
    pub road_tolls: Option<Decimal>,
}

impl TripChanges {
    /// Applies the edits onto an existing trip.
    pub fn apply_to(&self, trip: &mut Trip) {
        if let Some(v) = self.customer_id {
            trip.customer_id = v;
        }
        if let Some(v) = self.driver_id {
            trip.driver_id = v;
        }
        if let Some(v) = self.truck_id {
            trip.truck_id = v;
        }
        if let Some(v) = &self.origin {
            trip.origin = v.clone();
        }
        if let Some(v) = &self.destination {
            trip.destination = v.clone();
        }
        if let Some(v) = self.scheduled_date {
            trip.scheduled_date = v;
        }
        trip.distance = self.distance.or(trip.distance);
        trip.duration = self.duration.clone().or_else(|| trip.duration.clone());
        trip.rate = self.rate.or(trip.rate);
        trip.fuel = self.fuel.or(trip.fuel);
        trip.mileage = self.mileage.or(trip.mileage);
        trip.salary = self.salary.or(trip.salary);
        trip.road_tolls = self.road_tolls.or(trip.road_tolls);
    }
}

/// Equality filters for trip listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
}

impl TripFilters {
    pub fn matches(&self, trip: &Trip) -> bool {
        self.status.map_or(true, |s| trip.status == s)
            && self.customer_id.map_or(true, |id| trip.customer_id == id)
            && self.driver_id.map_or(true, |id| trip.driver_id == id)
            && self.truck_id.map_or(true, |id| trip.truck_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TripStatus::Scheduled, TripStatus::Ongoing, true)]
    #[case(TripStatus::Ongoing, TripStatus::Completed, true)]
    #[case(TripStatus::Ongoing, TripStatus::Scheduled, true)]
    #[case(TripStatus::Scheduled, TripStatus::Cancelled, true)]
    #[case(TripStatus::Ongoing, TripStatus::Cancelled, true)]
    #[case(TripStatus::Scheduled, TripStatus::Completed, false)]
    #[case(TripStatus::Completed, TripStatus::Ongoing, false)]
    #[case(TripStatus::Completed, TripStatus::Cancelled, false)]
    #[case(TripStatus::Cancelled, TripStatus::Scheduled, false)]
    #[case(TripStatus::Scheduled, TripStatus::Scheduled, false)]
    fn transition_table(#[case] from: TripStatus, #[case] to: TripStatus, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [TripStatus::Completed, TripStatus::Cancelled] {
            assert!(from.is_terminal());
            assert!(TripStatus::ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[rstest]
    #[case("scheduled", TripStatus::Scheduled)]
    #[case("Ongoing", TripStatus::Ongoing)]
    #[case("In Progress", TripStatus::Ongoing)]
    #[case("in progress", TripStatus::Ongoing)]
    #[case(" COMPLETED ", TripStatus::Completed)]
    #[case("cancelled", TripStatus::Cancelled)]
    fn parses_canonical_and_legacy_spellings(#[case] raw: &str, #[case] expected: TripStatus) {
        assert_eq!(raw.parse::<TripStatus>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "paused".parse::<TripStatus>().unwrap_err();
        assert_eq!(err.value, "paused");
    }

    #[test]
    fn json_accepts_legacy_spelling_but_writes_canonical() {
        let status: TripStatus = serde_json::from_str("\"in progress\"").unwrap();
        assert_eq!(status, TripStatus::Ongoing);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"ongoing\"");
        assert!(serde_json::from_str::<TripStatus>("\"paused\"").is_err());
    }

    #[test]
    fn ongoing_filter_covers_legacy_rows() {
        assert_eq!(
            TripStatus::Ongoing.stored_spellings(),
            vec!["ongoing".to_string(), "in progress".to_string()]
        );
        assert_eq!(TripStatus::Completed.stored_spellings(), vec!["completed"]);
    }
}
