use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::profile_dto::UpdateProfileRequest;
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::profile::{Profile, ProfileChanges, Role};
use crate::repositories::ProfileRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::require_text;

pub struct ProfileController {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileController {
    pub fn new(state: &AppState) -> Self {
        Self {
            profiles: state.profiles.clone(),
        }
    }

    pub async fn list(&self, role: Option<Role>) -> AppResult<Vec<Profile>> {
        self.profiles.list(role).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Profile> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Profile", &id))
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> AppResult<Profile> {
        self.profiles
            .find_by_user_id(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No profile for the current user".to_string()))
    }

    /// Owners may edit their own profile; admins may edit any profile and
    /// are the only ones who may change roles.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<ApiResponse<Profile>> {
        request.validate()?;

        let existing = self.get(id).await?;
        let is_admin = user.role == Role::Admin;
        if !is_admin && existing.user_id != user.user_id {
            return Err(AppError::Forbidden(
                "You can only edit your own profile".to_string(),
            ));
        }
        if request.role.is_some() && !is_admin {
            return Err(AppError::Forbidden(
                "Only administrators can change roles".to_string(),
            ));
        }

        let changes = ProfileChanges {
            name: request
                .name
                .as_deref()
                .map(|n| require_text("name", n))
                .transpose()?,
            phone: request.phone,
            role: request.role,
            avatar_url: request.avatar_url,
        };

        let profile = self
            .profiles
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Profile", &id))?;

        Ok(ApiResponse::success_with_message(profile, "Profile updated"))
    }
}
