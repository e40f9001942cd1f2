use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::TruckRepository;
use crate::models::truck::{NewTruck, Truck, TruckChanges, TruckStatus};
use crate::utils::errors::AppResult;

const TRUCK_COLUMNS: &str =
    "id, plate_number, model, capacity, status, assigned_driver_id, created_at, updated_at";

pub struct PgTruckRepository {
    pool: PgPool,
}

impl PgTruckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TruckRepository for PgTruckRepository {
    async fn create(&self, truck: NewTruck) -> AppResult<Truck> {
        let created = sqlx::query_as::<_, Truck>(&format!(
            r#"
            INSERT INTO trucks (id, plate_number, model, capacity, status, assigned_driver_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {TRUCK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(truck.plate_number)
        .bind(truck.model)
        .bind(truck.capacity)
        .bind(truck.status.as_str())
        .bind(truck.assigned_driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Truck>> {
        let truck = sqlx::query_as::<_, Truck>(&format!(
            "SELECT {TRUCK_COLUMNS} FROM trucks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(truck)
    }

    async fn list(&self, status: Option<TruckStatus>) -> AppResult<Vec<Truck>> {
        let trucks = sqlx::query_as::<_, Truck>(&format!(
            r#"
            SELECT {TRUCK_COLUMNS} FROM trucks
            WHERE ($1::text IS NULL OR lower(status) = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(trucks)
    }

    async fn plate_exists(&self, plate_number: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM trucks WHERE upper(plate_number) = upper($1))",
        )
        .bind(plate_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn update(&self, id: Uuid, changes: TruckChanges) -> AppResult<Option<Truck>> {
        let updated = sqlx::query_as::<_, Truck>(&format!(
            r#"
            UPDATE trucks
            SET model = COALESCE($2, model),
                capacity = COALESCE($3, capacity),
                status = COALESCE($4, status),
                assigned_driver_id = COALESCE($5, assigned_driver_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRUCK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.model)
        .bind(changes.capacity)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.assigned_driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
