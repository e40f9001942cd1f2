//! OTP model
//!
//! One row per issued code. A record is live while it is unverified and its
//! `expires_at` is in the future.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::profile::Role;

/// Signup data held until the email is verified.
///
/// The password is hashed before it is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingSignup {
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

/// OTP row - maps to the `otp_codes` table
#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub user_data: Option<Json<PendingSignup>>,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.verified && self.expires_at > now
    }
}

/// Data for a freshly issued code
#[derive(Debug, Clone)]
pub struct NewOtp {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub user_data: Option<PendingSignup>,
}
