use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ProfileRepository;
use crate::models::profile::{Profile, ProfileChanges, Role};
use crate::utils::errors::AppResult;

pub(crate) const PROFILE_COLUMNS: &str =
    "id, user_id, name, phone, role, is_verified, avatar_url, created_at, updated_at";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn list(&self, role: Option<Role>) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM profiles
            WHERE ($1::text IS NULL OR lower(role) = $1)
            ORDER BY name ASC
            "#
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn update(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>> {
        let updated = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.phone)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.avatar_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
