use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::MaintenanceRepository;
use crate::models::maintenance::{MaintenanceChanges, MaintenanceItem, NewMaintenanceItem};
use crate::models::report::DateRange;
use crate::utils::errors::AppResult;

const MAINTENANCE_COLUMNS: &str =
    "id, truck_id, trip_id, description, cost, maintenance_date, created_at";

pub struct PgMaintenanceRepository {
    pool: PgPool,
}

impl PgMaintenanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_in(
        tx: &mut Transaction<'_, Postgres>,
        item: NewMaintenanceItem,
    ) -> AppResult<MaintenanceItem> {
        let created = sqlx::query_as::<_, MaintenanceItem>(&format!(
            r#"
            INSERT INTO maintenance (id, truck_id, trip_id, description, cost, maintenance_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING {MAINTENANCE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(item.truck_id)
        .bind(item.trip_id)
        .bind(item.description)
        .bind(item.cost)
        .bind(item.maintenance_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }
}

#[async_trait]
impl MaintenanceRepository for PgMaintenanceRepository {
    async fn insert(&self, item: NewMaintenanceItem) -> AppResult<MaintenanceItem> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_in(&mut tx, item).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: MaintenanceChanges,
    ) -> AppResult<Option<MaintenanceItem>> {
        let updated = sqlx::query_as::<_, MaintenanceItem>(&format!(
            r#"
            UPDATE maintenance
            SET description = COALESCE($2, description),
                cost = COALESCE($3, cost),
                maintenance_date = COALESCE($4, maintenance_date)
            WHERE id = $1
            RETURNING {MAINTENANCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.description)
        .bind(changes.cost)
        .bind(changes.maintenance_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM maintenance WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_truck(
        &self,
        truck_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<MaintenanceItem>> {
        let items = sqlx::query_as::<_, MaintenanceItem>(&format!(
            r#"
            SELECT {MAINTENANCE_COLUMNS} FROM maintenance
            WHERE truck_id = $1
              AND ($2::date IS NULL OR maintenance_date >= $2)
              AND ($3::date IS NULL OR maintenance_date <= $3)
            ORDER BY maintenance_date DESC, created_at DESC
            "#
        ))
        .bind(truck_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_for_trip(&self, trip_id: Uuid) -> AppResult<Vec<MaintenanceItem>> {
        let items = sqlx::query_as::<_, MaintenanceItem>(&format!(
            r#"
            SELECT {MAINTENANCE_COLUMNS} FROM maintenance
            WHERE trip_id = $1
            ORDER BY maintenance_date DESC, created_at DESC
            "#
        ))
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn list_for_trips(&self, trip_ids: &[Uuid]) -> AppResult<Vec<MaintenanceItem>> {
        if trip_ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, MaintenanceItem>(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance WHERE trip_id = ANY($1)"
        ))
        .bind(trip_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn replace_for_trip(
        &self,
        trip_id: Uuid,
        items: Vec<NewMaintenanceItem>,
    ) -> AppResult<Vec<MaintenanceItem>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM maintenance WHERE trip_id = $1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            inserted.push(Self::insert_in(&mut tx, item).await?);
        }

        tx.commit().await?;
        tracing::debug!(
            "Replaced maintenance for trip {}: {} removed, {} inserted",
            trip_id,
            removed,
            inserted.len()
        );
        Ok(inserted)
    }
}
