// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profile management (sign-up, edits, removal).

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::{normalize_email, DEFAULT_COUNTRY_CODE};
use crate::models::{Role, User};
use crate::services::identity::{require_auth, require_permission, Identity};
use crate::services::rbac::get_active_role;
use crate::time_utils::now_millis;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Sign-up form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub last_name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    pub contact_emergency_name: Option<String>,
    pub contact_emergency_phone: Option<String>,
    pub birthday: String,
    pub phone: String,
    pub country_code: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    pub contact_emergency_name: Option<String>,
    pub contact_emergency_phone: Option<String>,
    pub birthday: Option<String>,
    pub phone: Option<String>,
    pub country_code: Option<String>,
}

impl UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.contact_emergency_name.is_none()
            && self.contact_emergency_phone.is_none()
            && self.birthday.is_none()
            && self.phone.is_none()
            && self.country_code.is_none()
    }

    fn apply(self, user: &mut User) {
        if let Some(v) = self.name {
            user.name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.email {
            user.email = normalize_email(&v);
        }
        if let Some(v) = self.contact_emergency_name {
            user.contact_emergency_name = v;
        }
        if let Some(v) = self.contact_emergency_phone {
            user.contact_emergency_phone = v;
        }
        if let Some(v) = self.birthday {
            user.birthday = v;
        }
        if let Some(v) = self.phone {
            user.phone = v;
        }
        if let Some(v) = self.country_code {
            user.country_code = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserMutationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UserMutationResult {
    fn ok() -> Self {
        Self {
            success: true,
            user_id: None,
            message: None,
        }
    }
}

/// Create a member profile from the sign-up form.
pub async fn create_user(
    db: &FirestoreDb,
    request: CreateUserRequest,
) -> Result<UserMutationResult> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = normalize_email(&request.email);

    let _guard = db.begin_mutation().await;

    let existing = db
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::creation_failed("Failed to create user", e))?;
    if existing.is_some() {
        return Err(AppError::UserCreationFailed {
            message: format!("User with email {} already exists", email),
            cause: None,
        });
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        last_name: request.last_name,
        email,
        contact_emergency_name: request.contact_emergency_name.unwrap_or_default(),
        contact_emergency_phone: request.contact_emergency_phone.unwrap_or_default(),
        birthday: request.birthday,
        phone: request.phone,
        country_code: request
            .country_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        clerk_id: None,
        created_at: now_millis(),
    };

    db.upsert_user(&user)
        .await
        .map_err(|e| AppError::creation_failed("Failed to create user", e))?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(UserMutationResult {
        user_id: Some(user.id),
        ..UserMutationResult::ok()
    })
}

/// Load `user_id` and check the caller owns it or is an ADMIN.
async fn load_for_write(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    user_id: &str,
) -> Result<User> {
    require_auth(identity)?;

    let user = db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::UserLookupFailed(format!("User {} not found", user_id)))?;

    let owner = user.clerk_id.as_deref().unwrap_or_default();
    if let Err(denied) = require_permission(identity, owner) {
        if get_active_role(db, identity).await? != Some(Role::Admin) {
            return Err(denied);
        }
    }

    Ok(user)
}

/// Patch the provided fields of a profile.
pub async fn update_user(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    user_id: &str,
    request: UpdateUserRequest,
) -> Result<UserMutationResult> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let _guard = db.begin_mutation().await;
    let mut user = load_for_write(db, identity, user_id).await?;

    if request.is_empty() {
        return Ok(UserMutationResult {
            message: Some("No fields to update".to_string()),
            ..UserMutationResult::ok()
        });
    }

    if let Some(email) = request.email.as_deref().map(normalize_email) {
        let holder = db
            .find_user_by_email(&email)
            .await
            .map_err(|e| AppError::creation_failed("Failed to update user", e))?;
        if holder.is_some_and(|other| other.id != user.id) {
            return Err(AppError::UserCreationFailed {
                message: format!("User with email {} already exists", email),
                cause: None,
            });
        }
    }

    request.apply(&mut user);
    db.upsert_user(&user)
        .await
        .map_err(|e| AppError::creation_failed("Failed to update user", e))?;

    tracing::info!(user_id = %user.id, "User profile updated");
    Ok(UserMutationResult::ok())
}

/// Remove a profile. Role history and audit events are kept.
pub async fn delete_user(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    user_id: &str,
) -> Result<UserMutationResult> {
    let _guard = db.begin_mutation().await;
    let user = load_for_write(db, identity, user_id).await?;

    db.delete_user(&user.id)
        .await
        .map_err(|e| AppError::creation_failed("Failed to delete user", e))?;

    tracing::info!(user_id = %user.id, "User profile deleted");
    Ok(UserMutationResult::ok())
}
