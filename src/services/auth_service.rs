//! Password login
//!
//! Accounts are only created through OTP verification; this service checks
//! credentials for existing, verified accounts and issues access tokens.

use std::sync::Arc;

use bcrypt::{hash, verify};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::profile::Role;
use crate::repositories::AccountRepository;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::normalize_email;

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
}

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost).map_err(|e| AppError::Hash(e.to_string()))
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountRepository>, jwt: Arc<JwtService>) -> Self {
        Self { accounts, jwt }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let email = normalize_email(email);
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let credentials = self
            .accounts
            .find_credentials(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify(password, &credentials.password_hash).map_err(|e| AppError::Hash(e.to_string()))? {
            warn!("🔐 Failed login for {}", email);
            return Err(invalid());
        }

        if !credentials.is_verified {
            return Err(AppError::Unauthorized(
                "Account email has not been verified".to_string(),
            ));
        }

        let token = self.jwt.issue(credentials.user_id, credentials.role)?;
        info!("🔐 {} logged in", email);

        Ok(LoginOutcome {
            token,
            user_id: credentials.user_id,
            role: credentials.role,
        })
    }
}
