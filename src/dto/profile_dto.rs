use serde::Deserialize;
use validator::Validate;

use crate::models::profile::Role;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub role: Option<Role>,
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileListQuery {
    pub role: Option<Role>,
}
