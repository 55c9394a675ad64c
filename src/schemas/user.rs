use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_datetime;
use crate::db::models::{User, UserProfile};
use crate::db::types::UserRole;

/// Input of the user-creation workflow. Required fields are optional here so a missing
/// one can be reported by name instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserCreate {
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub(crate) user_id: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub(crate) email: Option<String>,
    #[validate(length(min = 1, message = "firstName must not be empty"))]
    pub(crate) first_name: Option<String>,
    #[validate(length(min = 1, message = "lastName must not be empty"))]
    pub(crate) last_name: Option<String>,
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) profile: Option<UserProfile>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    pub(crate) user_id: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: UserRole,
    pub(crate) date_joined: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) profile: Option<UserProfile>,
    pub(crate) is_active: bool,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            date_joined: format_datetime(user.date_joined),
            profile: user.profile,
            is_active: user.is_active,
        }
    }
}
