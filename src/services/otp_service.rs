//! Email OTP verification
//!
//! At most one live code per email. Issuing a new code removes the previous
//! live one. Verification does not count attempts; a code stays usable until
//! it is verified or expires. A code whose pending account cannot be created
//! is released again.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::models::otp::{NewOtp, PendingSignup};
use crate::models::profile::{NewAccount, Profile, Role};
use crate::repositories::{AccountRepository, OtpRepository};
use crate::services::auth_service::hash_password;
use crate::services::otp_delivery::OtpDelivery;
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::validation::{normalize_email, require_text};

pub const OTP_LENGTH: usize = 6;

/// Signup data as submitted, before the password is hashed
#[derive(Debug, Clone)]
pub struct SignupData {
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub password: String,
}

/// Result of a successful verification
#[derive(Debug, Clone)]
pub struct OtpVerification {
    /// The account created from pending signup data, if any.
    pub account: Option<Profile>,
}

/// Uniform six-digit code, no leading zero.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

#[derive(Clone)]
pub struct OtpService {
    otps: Arc<dyn OtpRepository>,
    accounts: Arc<dyn AccountRepository>,
    delivery: Arc<dyn OtpDelivery>,
    ttl: Duration,
    hash_cost: u32,
}

impl OtpService {
    pub fn new(
        otps: Arc<dyn OtpRepository>,
        accounts: Arc<dyn AccountRepository>,
        delivery: Arc<dyn OtpDelivery>,
        ttl: Duration,
        hash_cost: u32,
    ) -> Self {
        Self {
            otps,
            accounts,
            delivery,
            ttl,
            hash_cost,
        }
    }

    pub async fn issue(&self, email: &str, signup: Option<SignupData>) -> AppResult<DateTime<Utc>> {
        self.issue_at(email, signup, Utc::now()).await
    }

    /// Stores and sends a fresh code. Returns its expiry.
    pub async fn issue_at(
        &self,
        email: &str,
        signup: Option<SignupData>,
        now: DateTime<Utc>,
    ) -> AppResult<DateTime<Utc>> {
        let email = normalize_email(email);

        let user_data = match signup {
            Some(signup) => {
                if self.accounts.email_exists(&email).await? {
                    return Err(conflict_error("Account", "email", &email));
                }
                if signup.role == Some(Role::Admin) {
                    return Err(AppError::Forbidden(
                        "Administrator accounts cannot be self-registered".to_string(),
                    ));
                }
                if signup.password.len() < 8 {
                    return Err(AppError::InvalidInput(
                        "Password must be at least 8 characters".to_string(),
                    ));
                }
                Some(PendingSignup {
                    name: require_text("name", &signup.name)?,
                    phone: signup.phone,
                    role: signup.role.unwrap_or_default(),
                    password_hash: hash_password(&signup.password, self.hash_cost)?,
                })
            }
            None => None,
        };

        let replaced = self.otps.delete_live_for_email(&email, now).await?;
        if replaced > 0 {
            debug!("Replaced {} live code(s) for {}", replaced, email);
        }

        let code = generate_code();
        let expires_at = now + self.ttl;
        self.otps
            .insert(NewOtp {
                email: email.clone(),
                code: code.clone(),
                expires_at,
                user_data,
            })
            .await?;

        self.delivery.send(&email, &code, expires_at).await?;
        info!("🔑 Verification code issued for {}", email);
        Ok(expires_at)
    }

    pub async fn verify(&self, email: &str, code: &str) -> AppResult<OtpVerification> {
        self.verify_at(email, code, Utc::now()).await
    }

    /// Consumes a live code. Wrong, used and expired codes all fail the same
    /// way.
    pub async fn verify_at(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<OtpVerification> {
        let email = normalize_email(email);
        let code = code.trim();
        if !is_well_formed(code) {
            return Err(AppError::InvalidOtp);
        }

        let record = self
            .otps
            .find_live(&email, code, now)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        if !self.otps.mark_verified(record.id).await? {
            return Err(AppError::InvalidOtp);
        }

        let account = match record.user_data {
            Some(signup) => {
                let signup = signup.0;
                let created = self
                    .accounts
                    .create_account(NewAccount {
                        email: email.clone(),
                        password_hash: signup.password_hash,
                        name: signup.name,
                        phone: signup.phone,
                        role: signup.role,
                    })
                    .await;
                match created {
                    Ok(profile) => {
                        info!("👤 Account created for {}", email);
                        Some(profile)
                    }
                    Err(e) => {
                        // The code is not spent when the account it carried was not created.
                        if let Err(release_error) = self.otps.release(record.id).await {
                            warn!("Could not release code for {}: {}", email, release_error);
                        }
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        info!("✅ {} verified", email);
        Ok(OtpVerification { account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryStore;
    use crate::services::otp_delivery::RecordingOtpDelivery;

    struct Fixture {
        store: Arc<InMemoryStore>,
        outbox: Arc<RecordingOtpDelivery>,
        service: OtpService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let outbox = Arc::new(RecordingOtpDelivery::new());
        let service = OtpService::new(
            store.clone(),
            store.clone(),
            outbox.clone(),
            Duration::minutes(10),
            4,
        );
        Fixture {
            store,
            outbox,
            service,
        }
    }

    fn signup() -> SignupData {
        SignupData {
            name: "Alex".into(),
            phone: None,
            role: None,
            password: "correct horse".into(),
        }
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert!(is_well_formed(&code), "bad code {}", code);
        }
    }

    #[tokio::test]
    async fn codes_expire_after_ten_minutes() {
        let f = fixture();
        let now = Utc::now();
        let expires_at = f.service.issue_at("a@b.com", None, now).await.unwrap();
        assert_eq!(expires_at - now, Duration::minutes(10));

        let code = f.outbox.last_code_for("a@b.com").unwrap();
        let late = expires_at + Duration::seconds(1);
        assert!(matches!(
            f.service.verify_at("a@b.com", &code, late).await,
            Err(AppError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn wrong_code_then_right_code() {
        let f = fixture();
        let now = Utc::now();
        f.service.issue_at("a@b.com", None, now).await.unwrap();
        let code = f.outbox.last_code_for("a@b.com").unwrap();
        let wrong = if code == "123456" { "654321" } else { "123456" };

        assert!(matches!(
            f.service.verify_at("a@b.com", wrong, now).await,
            Err(AppError::InvalidOtp)
        ));
        let verified = f.service.verify_at("a@b.com", &code, now).await.unwrap();
        assert!(verified.account.is_none());

        assert!(matches!(
            f.service.verify_at("a@b.com", &code, now).await,
            Err(AppError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn reissue_keeps_one_live_code() {
        let f = fixture();
        let now = Utc::now();
        f.service.issue_at("a@b.com", None, now).await.unwrap();
        let first = f.outbox.last_code_for("a@b.com").unwrap();
        f.service.issue_at("A@B.com", None, now).await.unwrap();
        let second = f.outbox.last_code_for("a@b.com").unwrap();

        assert_eq!(f.store.otp_count("a@b.com").await, 1);
        if first != second {
            assert!(f.service.verify_at("a@b.com", &first, now).await.is_err());
        }
        assert!(f.service.verify_at("a@b.com", &second, now).await.is_ok());
    }

    #[tokio::test]
    async fn verification_creates_the_pending_account() {
        let f = fixture();
        let now = Utc::now();
        f.service
            .issue_at("new@triptrac.test", Some(signup()), now)
            .await
            .unwrap();
        let code = f.outbox.last_code_for("new@triptrac.test").unwrap();

        let verified = f
            .service
            .verify_at("new@triptrac.test", &code, now)
            .await
            .unwrap();
        let profile = verified.account.unwrap();
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.role, Role::Driver);
        assert!(profile.is_verified);

        let credentials = f
            .store
            .find_credentials("new@triptrac.test")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(credentials.password_hash, "correct horse");

        let again = f
            .service
            .issue_at("new@triptrac.test", Some(signup()), now)
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn signup_cannot_request_admin_role() {
        let f = fixture();
        let request = SignupData {
            role: Some(Role::Admin),
            ..signup()
        };
        let result = f
            .service
            .issue_at("mallory@triptrac.test", Some(request), Utc::now())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(f.store.otp_count("mallory@triptrac.test").await, 0);
        assert!(f.outbox.last_code_for("mallory@triptrac.test").is_none());
    }

    #[tokio::test]
    async fn failed_account_creation_leaves_the_code_usable() {
        let f = fixture();
        let now = Utc::now();
        let email = "race@triptrac.test";
        f.service.issue_at(email, Some(signup()), now).await.unwrap();
        let code = f.outbox.last_code_for(email).unwrap();

        f.store
            .create_account(NewAccount {
                email: email.to_string(),
                password_hash: "elsewhere".to_string(),
                name: "First".to_string(),
                phone: None,
                role: Role::Driver,
            })
            .await
            .unwrap();

        let result = f.service.verify_at(email, &code, now).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let record = f.store.find_live(email, &code, now).await.unwrap();
        assert!(record.is_some_and(|r| !r.verified));
    }

    #[tokio::test]
    async fn malformed_codes_are_rejected_without_lookup() {
        let f = fixture();
        for code in ["", "12345", "1234567", "12a456"] {
            assert!(matches!(
                f.service.verify_at("a@b.com", code, Utc::now()).await,
                Err(AppError::InvalidOtp)
            ));
        }
    }
}
