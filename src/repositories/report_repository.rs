use async_trait::async_trait;
use sqlx::PgPool;

use super::ReportRepository;
use crate::models::report::{
    CustomerReportFilters, CustomerReportSource, DateRange, TripReportFilters, TripReportSource,
    TruckReportFilters, TruckReportSource,
};
use crate::utils::errors::AppResult;

/// Read-only joins feeding the report generator.
///
/// Each call is an independent query; no transaction spans them. Date bounds
/// compare UTC calendar days whatever the session `TimeZone` is.
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn trip_rows(
        &self,
        range: DateRange,
        filters: &TripReportFilters,
    ) -> AppResult<Vec<TripReportSource>> {
        let rows = sqlx::query_as::<_, TripReportSource>(
            r#"
            SELECT t.id, t.scheduled_date, t.status, t.origin, t.destination, t.distance,
                   t."RATE" AS rate, t."FUEL" AS fuel, t."MILEAGE" AS mileage,
                   t."SALARY" AS salary, t."ROAD TOLLS" AS road_tolls,
                   c.name AS customer_name,
                   k.plate_number AS truck_plate, k.model AS truck_model,
                   p.name AS driver_name
            FROM trips t
            LEFT JOIN customers c ON c.id = t.customer_id
            LEFT JOIN trucks k ON k.id = t.truck_id
            LEFT JOIN profiles p ON p.id = t.driver_id
            WHERE ($1::date IS NULL OR (t.scheduled_date AT TIME ZONE 'UTC')::date >= $1)
              AND ($2::date IS NULL OR (t.scheduled_date AT TIME ZONE 'UTC')::date <= $2)
              AND ($3::text[] IS NULL OR lower(t.status) = ANY($3))
              AND ($4::uuid IS NULL OR t.customer_id = $4)
              AND ($5::uuid IS NULL OR t.truck_id = $5)
              AND ($6::uuid IS NULL OR t.driver_id = $6)
            ORDER BY t.scheduled_date DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .bind(filters.status.map(|s| s.stored_spellings()))
        .bind(filters.customer_id)
        .bind(filters.truck_id)
        .bind(filters.driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn customer_rows(
        &self,
        range: DateRange,
        _filters: &CustomerReportFilters,
    ) -> AppResult<Vec<CustomerReportSource>> {
        let rows = sqlx::query_as::<_, CustomerReportSource>(
            r#"
            SELECT c.id, c.name, c.contact_person, c.email, c.phone, c.address, c.created_at,
                   COUNT(t.id) AS trip_count
            FROM customers c
            LEFT JOIN trips t ON t.customer_id = c.id
            WHERE ($1::date IS NULL OR (c.created_at AT TIME ZONE 'UTC')::date >= $1)
              AND ($2::date IS NULL OR (c.created_at AT TIME ZONE 'UTC')::date <= $2)
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn truck_rows(
        &self,
        range: DateRange,
        filters: &TruckReportFilters,
    ) -> AppResult<Vec<TruckReportSource>> {
        let rows = sqlx::query_as::<_, TruckReportSource>(
            r#"
            SELECT k.id, k.plate_number, k.model, k.capacity, k.status,
                   p.name AS driver_name, k.created_at,
                   COUNT(t.id) AS trip_count
            FROM trucks k
            LEFT JOIN profiles p ON p.id = k.assigned_driver_id
            LEFT JOIN trips t ON t.truck_id = k.id
            WHERE ($1::date IS NULL OR (k.created_at AT TIME ZONE 'UTC')::date >= $1)
              AND ($2::date IS NULL OR (k.created_at AT TIME ZONE 'UTC')::date <= $2)
              AND ($3::text IS NULL OR lower(k.status) = $3)
              AND ($4::uuid IS NULL OR k.assigned_driver_id = $4)
            GROUP BY k.id, p.name
            ORDER BY k.created_at DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .bind(filters.status.map(|s| s.as_str()))
        .bind(filters.assigned_driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
