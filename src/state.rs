//! Shared application state
//!
//! Holds the repositories behind trait objects, the configuration and the
//! collaborators every handler may need. Services are cheap to build from it
//! per request.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    AccountRepository, CustomerRepository, InMemoryStore, MaintenanceRepository, OtpRepository,
    PgAccountRepository, PgCustomerRepository, PgMaintenanceRepository, PgOtpRepository,
    PgProfileRepository, PgReportRepository, PgTripRepository, PgTruckRepository,
    ProfileRepository, ReportRepository, TripRepository, TruckRepository,
};
use crate::services::{
    AuthService, HttpOtpDelivery, JwtService, LogOtpDelivery, MaintenanceLedger, OtpDelivery,
    OtpService, ReportService, TripLifecycleService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub customers: Arc<dyn CustomerRepository>,
    pub trucks: Arc<dyn TruckRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub maintenance: Arc<dyn MaintenanceRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub otp_delivery: Arc<dyn OtpDelivery>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    /// State backed by PostgreSQL. OTP codes go through the HTTP relay when
    /// `OTP_DELIVERY_URL` is set and to the log otherwise.
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        let otp_delivery: Arc<dyn OtpDelivery> = match &config.otp_delivery_url {
            Some(url) => Arc::new(HttpOtpDelivery::new(
                url.clone(),
                config.otp_delivery_api_key.clone(),
                config.otp_sender.clone(),
            )),
            None => {
                tracing::warn!("⚠️ OTP_DELIVERY_URL not set, verification codes will be logged");
                Arc::new(LogOtpDelivery)
            }
        };

        Self {
            jwt: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiration)),
            customers: Arc::new(PgCustomerRepository::new(pool.clone())),
            trucks: Arc::new(PgTruckRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            trips: Arc::new(PgTripRepository::new(pool.clone())),
            maintenance: Arc::new(PgMaintenanceRepository::new(pool.clone())),
            reports: Arc::new(PgReportRepository::new(pool.clone())),
            otps: Arc::new(PgOtpRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool)),
            otp_delivery,
            config,
        }
    }

    /// State backed by one in-memory store.
    pub fn with_store(
        store: Arc<InMemoryStore>,
        otp_delivery: Arc<dyn OtpDelivery>,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiration)),
            customers: store.clone(),
            trucks: store.clone(),
            profiles: store.clone(),
            trips: store.clone(),
            maintenance: store.clone(),
            reports: store.clone(),
            otps: store.clone(),
            accounts: store,
            otp_delivery,
            config,
        }
    }

    pub fn lifecycle(&self) -> TripLifecycleService {
        TripLifecycleService::new(self.trips.clone())
    }

    pub fn ledger(&self) -> MaintenanceLedger {
        MaintenanceLedger::new(
            self.maintenance.clone(),
            self.trips.clone(),
            self.trucks.clone(),
        )
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.reports.clone(), self.maintenance.clone())
    }

    pub fn otp_service(&self) -> OtpService {
        OtpService::new(
            self.otps.clone(),
            self.accounts.clone(),
            self.otp_delivery.clone(),
            self.config.otp_ttl(),
            self.config.bcrypt_cost,
        )
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.accounts.clone(), self.jwt.clone())
    }
}
