use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::profile_repository::PROFILE_COLUMNS;
use super::AccountRepository;
use crate::models::profile::{Credentials, NewAccount, Profile};
use crate::utils::errors::{conflict_error, AppResult};

/// Credentials (`users`) and profiles (`profiles`) created together.
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create_account(&self, account: NewAccount) -> AppResult<Profile> {
        let mut tx = self.pool.begin().await?;
        let user_id = Uuid::new_v4();

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(conflict_error("Account", "email", &account.email));
        }

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, user_id, name, phone, role, is_verified, avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NULL, NOW(), NOW())
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(account.name)
        .bind(account.phone)
        .bind(account.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>> {
        let credentials = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT u.id AS user_id, u.email, u.password_hash, p.role, p.is_verified
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }
}
