use std::sync::Arc;

use validator::Validate;

use crate::dto::auth_dto::{
    IssueOtpRequest, IssueOtpResponse, LoginRequest, LoginResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use crate::services::auth_service::AuthService;
use crate::services::jwt_service::JwtService;
use crate::services::otp_service::{OtpService, SignupData};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    otp: OtpService,
    auth: AuthService,
    jwt: Arc<JwtService>,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            otp: state.otp_service(),
            auth: state.auth_service(),
            jwt: state.jwt.clone(),
        }
    }

    pub async fn issue_otp(&self, request: IssueOtpRequest) -> AppResult<IssueOtpResponse> {
        request.validate()?;
        let signup: Option<SignupData> = request.user_data.map(Into::into);
        let expires_at = self.otp.issue(&request.email, signup).await?;
        Ok(IssueOtpResponse {
            success: true,
            message: "Verification code sent".to_string(),
            expires_at,
        })
    }

    /// A verified signup is logged in straight away.
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> AppResult<VerifyOtpResponse> {
        let verification = self.otp.verify(&request.email, &request.otp_code).await?;
        match verification.account {
            Some(profile) => {
                let token = self.jwt.issue(profile.user_id, profile.role)?;
                Ok(VerifyOtpResponse {
                    success: true,
                    user_id: Some(profile.user_id),
                    token: Some(token),
                })
            }
            None => Ok(VerifyOtpResponse {
                success: true,
                user_id: None,
                token: None,
            }),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;
        let outcome = self.auth.login(&request.email, &request.password).await?;
        Ok(LoginResponse {
            success: true,
            token: outcome.token,
            user_id: outcome.user_id,
            role: outcome.role,
        })
    }
}
