use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::OtpRepository;
use crate::models::otp::{NewOtp, OtpRecord};
use crate::utils::errors::AppResult;

const OTP_COLUMNS: &str = "id, email, code, expires_at, verified, user_data, created_at";

pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    async fn delete_live_for_email(&self, email: &str, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM otp_codes WHERE email = $1 AND verified = FALSE AND expires_at > $2",
        )
        .bind(email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert(&self, otp: NewOtp) -> AppResult<OtpRecord> {
        let record = sqlx::query_as::<_, OtpRecord>(&format!(
            r#"
            INSERT INTO otp_codes (id, email, code, expires_at, verified, user_data, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, NOW())
            RETURNING {OTP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(otp.email)
        .bind(otp.code)
        .bind(otp.expires_at)
        .bind(otp.user_data.map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_live(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<OtpRecord>> {
        let record = sqlx::query_as::<_, OtpRecord>(&format!(
            r#"
            SELECT {OTP_COLUMNS} FROM otp_codes
            WHERE email = $1 AND code = $2 AND verified = FALSE AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE otp_codes SET verified = TRUE WHERE id = $1 AND verified = FALSE")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE otp_codes SET verified = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
