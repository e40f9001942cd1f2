use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::TripRepository;
use crate::models::trip::{NewTrip, Trip, TripChanges, TripFilters, TripStatus};
use crate::utils::errors::AppResult;

/// The monetary columns keep their historical capitalised identifiers.
const TRIP_COLUMNS: &str = r#"id, customer_id, driver_id, truck_id, origin, destination, scheduled_date,
    distance, duration, "RATE", "FUEL", "MILEAGE", "SALARY", "ROAD TOLLS", status, created_at, updated_at"#;

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip> {
        let created = sqlx::query_as::<_, Trip>(&format!(
            r#"
            INSERT INTO trips (
                id, customer_id, driver_id, truck_id, origin, destination, scheduled_date,
                distance, duration, "RATE", "FUEL", "MILEAGE", "SALARY", "ROAD TOLLS",
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW())
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(trip.customer_id)
        .bind(trip.driver_id)
        .bind(trip.truck_id)
        .bind(trip.origin)
        .bind(trip.destination)
        .bind(trip.scheduled_date)
        .bind(trip.distance)
        .bind(trip.duration)
        .bind(trip.charges.rate)
        .bind(trip.charges.fuel)
        .bind(trip.charges.mileage)
        .bind(trip.charges.salary)
        .bind(trip.charges.road_tolls)
        .bind(TripStatus::Scheduled.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            r#"
            SELECT {TRIP_COLUMNS} FROM trips
            WHERE ($1::text[] IS NULL OR lower(status) = ANY($1))
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::uuid IS NULL OR driver_id = $3)
              AND ($4::uuid IS NULL OR truck_id = $4)
            ORDER BY scheduled_date DESC
            "#
        ))
        .bind(filters.status.map(|s| s.stored_spellings()))
        .bind(filters.customer_id)
        .bind(filters.driver_id)
        .bind(filters.truck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn update(&self, id: Uuid, changes: TripChanges) -> AppResult<Option<Trip>> {
        let updated = sqlx::query_as::<_, Trip>(&format!(
            r#"
            UPDATE trips
            SET customer_id = COALESCE($2, customer_id),
                driver_id = COALESCE($3, driver_id),
                truck_id = COALESCE($4, truck_id),
                origin = COALESCE($5, origin),
                destination = COALESCE($6, destination),
                scheduled_date = COALESCE($7, scheduled_date),
                distance = COALESCE($8, distance),
                duration = COALESCE($9, duration),
                "RATE" = COALESCE($10, "RATE"),
                "FUEL" = COALESCE($11, "FUEL"),
                "MILEAGE" = COALESCE($12, "MILEAGE"),
                "SALARY" = COALESCE($13, "SALARY"),
                "ROAD TOLLS" = COALESCE($14, "ROAD TOLLS"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.customer_id)
        .bind(changes.driver_id)
        .bind(changes.truck_id)
        .bind(changes.origin)
        .bind(changes.destination)
        .bind(changes.scheduled_date)
        .bind(changes.distance)
        .bind(changes.duration)
        .bind(changes.rate)
        .bind(changes.fuel)
        .bind(changes.mileage)
        .bind(changes.salary)
        .bind(changes.road_tolls)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM maintenance WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, id: Uuid, status: TripStatus) -> AppResult<Option<Trip>> {
        let updated = sqlx::query_as::<_, Trip>(&format!(
            r#"
            UPDATE trips
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM trips
            WHERE lower(status) = 'scheduled' AND scheduled_date <= $1
            ORDER BY scheduled_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn start_scheduled(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let started: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE trips
            SET status = 'ongoing', updated_at = NOW()
            WHERE id = ANY($1) AND lower(status) = 'scheduled'
            RETURNING id
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(started.into_iter().map(|(id,)| id).collect())
    }
}
