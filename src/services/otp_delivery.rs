//! OTP delivery
//!
//! How an issued code leaves the service. Production relays it to an email
//! sending API over HTTP and development logs it. Tests record it, behind the
//! `test-support` feature.

#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn send(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> AppResult<()>;
}

/// Posts the code as JSON to an email relay.
pub struct HttpOtpDelivery {
    client: Client,
    url: String,
    api_key: Option<String>,
    sender: String,
}

impl HttpOtpDelivery {
    pub fn new(url: String, api_key: Option<String>, sender: String) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl OtpDelivery for HttpOtpDelivery {
    async fn send(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let body = json!({
            "from": self.sender,
            "to": [email],
            "subject": "Your TripTrac verification code",
            "text": format!(
                "Your verification code is {}. It expires at {}.",
                code,
                expires_at.format("%H:%M UTC")
            ),
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OTP relay unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("❌ OTP relay answered {}: {}", status, text);
            return Err(AppError::ExternalApi(format!(
                "OTP relay answered {}",
                status
            )));
        }

        info!("📧 Verification code sent to {}", email);
        Ok(())
    }
}

/// Writes codes to the log instead of sending them. Development only.
pub struct LogOtpDelivery;

#[async_trait]
impl OtpDelivery for LogOtpDelivery {
    async fn send(&self, email: &str, code: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        info!(
            "📧 Verification code for {}: {} (expires {})",
            email, code, expires_at
        );
        Ok(())
    }
}

/// Keeps every sent code in memory.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct RecordingOtpDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingOtpDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl OtpDelivery for RecordingOtpDelivery {
    async fn send(&self, email: &str, code: &str, _expires_at: DateTime<Utc>) -> AppResult<()> {
        self.sent
            .lock()
            .map_err(|_| AppError::Internal("OTP outbox lock poisoned".to_string()))?
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
