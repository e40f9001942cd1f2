//! JWT issuing and validation (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::Role;
use crate::utils::errors::{AppError, AppResult};

/// Access token claims; `sub` is the auth identity (`users.id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration: Duration::seconds(expiration_secs as i64),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            exp: (now + self.expiration).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating access token: {}", e)))
    }

    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_validate() {
        let service = JwtService::new("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, Role::Dispatcher).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Dispatcher);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn foreign_or_garbled_tokens_are_rejected() {
        let ours = JwtService::new("test-secret", 3600);
        let theirs = JwtService::new("other-secret", 3600);
        let token = theirs.issue(Uuid::new_v4(), Role::Admin).unwrap();

        assert!(matches!(ours.validate(&token), Err(AppError::Unauthorized(_))));
        assert!(ours.validate("not.a.token").is_err());
    }
}
