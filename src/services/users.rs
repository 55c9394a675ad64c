use mongodb::Database;
use validator::Validate;

use crate::core::metrics::record_operation;
use crate::core::time::now_utc;
use crate::db::models::{User, UserProfile};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::UserCreate;
use crate::services::errors::WorkflowError;
use crate::services::{observed, require};

pub(crate) async fn create_user(db: &Database, data: UserCreate) -> Result<String, WorkflowError> {
    observed("create_user", create_user_inner(db, data).await)
}

async fn create_user_inner(db: &Database, data: UserCreate) -> Result<String, WorkflowError> {
    let user = build_user(data)?;

    match repositories::users::insert(db, &user).await {
        Ok(()) => {
            tracing::info!(user_id = %user.user_id, "User created");
            Ok(user.user_id)
        }
        Err(err) => Err(WorkflowError::from_write(err, "Error creating user", || {
            WorkflowError::DuplicateKey(format!(
                "User with userId '{}' or email '{}' already exists",
                user.user_id, user.email
            ))
        })),
    }
}

fn build_user(data: UserCreate) -> Result<User, WorkflowError> {
    let user_id = require(data.user_id.clone(), "userId")?;
    let email = require(data.email.clone(), "email")?;
    let first_name = require(data.first_name.clone(), "firstName")?;
    let last_name = require(data.last_name.clone(), "lastName")?;
    let role = require(data.role.as_deref(), "role")?;

    data.validate()?;
    let role = role
        .parse::<UserRole>()
        .map_err(|err| WorkflowError::ValidationRejected(err.to_string()))?;

    Ok(User {
        id: None,
        user_id,
        email,
        first_name,
        last_name,
        role,
        date_joined: now_utc(),
        profile: data.profile,
        is_active: data.is_active.unwrap_or(true),
    })
}

/// Store failures are logged and reported as "no user".
pub(crate) async fn get_user_by_email(db: &Database, email: &str) -> Option<User> {
    match repositories::users::find_by_email(db, email).await {
        Ok(user) => {
            if user.is_some() {
                tracing::info!(email, "User found");
            } else {
                tracing::info!(email, "User not found");
            }
            record_operation("get_user_by_email", "ok");
            user
        }
        Err(err) => {
            let err = WorkflowError::unexpected(err, "Error finding user");
            record_operation("get_user_by_email", err.kind().as_str());
            None
        }
    }
}

/// Replaces the whole profile. Returns the modified count (0 when nothing changed).
pub(crate) async fn update_user_profile(
    db: &Database,
    user_id: &str,
    profile: &UserProfile,
) -> Result<u64, WorkflowError> {
    let result = match repositories::users::set_profile(db, user_id, profile).await {
        Ok(update) if update.matched_count == 0 => {
            Err(WorkflowError::NotFound("User not found".to_string()))
        }
        Ok(update) => {
            tracing::info!(user_id, "User profile updated");
            Ok(update.modified_count)
        }
        Err(err) => Err(WorkflowError::unexpected(err, "Error updating user profile")),
    };
    observed("update_user_profile", result)
}

/// Soft delete. Enrollments of the user are left untouched.
pub(crate) async fn deactivate_user(db: &Database, user_id: &str) -> Result<(), WorkflowError> {
    let result = match repositories::users::set_active(db, user_id, false).await {
        Ok(update) if update.matched_count == 0 => {
            Err(WorkflowError::NotFound("User not found".to_string()))
        }
        Ok(_) => {
            tracing::info!(user_id, "User deactivated");
            Ok(())
        }
        Err(err) => Err(WorkflowError::unexpected(err, "Error deactivating user")),
    };
    observed("deactivate_user", result)
}
