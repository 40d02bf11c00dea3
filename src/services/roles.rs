// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role management: admin role changes, the one-time admin seed, and
//! admin listings.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::{AuthEventType, Role, RoleAssignment};
use crate::services::audit::{log_auth_event, AuthEventPayload};
use crate::services::identity::{require_auth, require_current_user_profile, Identity};
use crate::services::rbac::guard_role;
use crate::time_utils::now_millis;
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Concurrent role lookups when listing users.
const MAX_CONCURRENT_ROLE_LOOKUPS: usize = 16;

/// Replace `user_id`'s active role with a new active assignment.
///
/// The previous assignment is kept with `active = false`.
async fn replace_active_role(
    db: &FirestoreDb,
    user_id: &str,
    current: Option<RoleAssignment>,
    role: Role,
    now: i64,
    assigned_by: Option<String>,
) -> Result<RoleAssignment> {
    if let Some(mut previous) = current {
        previous.active = false;
        db.upsert_role_assignment(&previous).await?;
    }

    let assignment = RoleAssignment::new_active(user_id, role, now, assigned_by);
    db.upsert_role_assignment(&assignment).await?;
    Ok(assignment)
}

// ─── setRole ─────────────────────────────────────────────────

/// Request to change a user's active role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetRoleRequest {
    #[validate(length(min = 1, message = "targetUserId is required"))]
    pub target_user_id: String,
    pub role: Role,
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Outcome of a role change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleResult {
    pub changed: bool,
    pub user_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | undefined"))]
    pub assigned_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Change a target user's active role. Caller must hold ADMIN.
pub async fn set_role(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    request: SetRoleRequest,
) -> Result<SetRoleResult> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let _guard = db.begin_mutation().await;

    guard_role(db, identity, Role::Admin).await?;
    let actor = require_current_user_profile(db, identity).await?;

    let target_id = request.target_user_id.as_str();
    if db.get_user(target_id).await?.is_none() {
        return Err(AppError::UserLookupFailed("Target user not found".to_string()));
    }

    let current = db.get_active_role_assignment(target_id).await?;
    if let Some(active) = current.as_ref().filter(|ra| ra.role == request.role) {
        tracing::debug!(user_id = %target_id, role = %active.role, "Role already active");
        return Ok(SetRoleResult {
            changed: false,
            user_id: target_id.to_string(),
            role: active.role,
            reason: None,
            assigned_at: None,
            assigned_by_user_id: None,
            message: Some("Role already active".to_string()),
        });
    }

    let old_role = current.as_ref().map(|ra| ra.role);
    let now = now_millis();
    let assignment = replace_active_role(
        db,
        target_id,
        current,
        request.role,
        now,
        Some(actor.id.clone()),
    )
    .await?;

    log_auth_event(
        db,
        AuthEventPayload::new(AuthEventType::RoleChanged)
            .actor(&actor.id)
            .target(target_id)
            .metadata(serde_json::json!({
                "newRole": request.role,
                "oldRole": old_role,
                "reason": request.reason,
            }))
            .at(now),
    )
    .await?;

    tracing::info!(
        actor = %actor.id,
        user_id = %target_id,
        old_role = ?old_role,
        new_role = %request.role,
        "Role changed"
    );

    Ok(SetRoleResult {
        changed: true,
        user_id: target_id.to_string(),
        role: assignment.role,
        reason: request.reason,
        assigned_at: Some(assignment.assigned_at),
        assigned_by_user_id: assignment.assigned_by_user_id,
        message: None,
    })
}

// ─── seedAdminByEmail ────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedAdminRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SeedAdminResult {
    pub seeded: bool,
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub assigned_at: i64,
}

async fn log_seed_blocked(db: &FirestoreDb, email: &str, reason: &str, now: i64) -> Result<()> {
    tracing::warn!(email = %email, reason, "Admin seed blocked");
    log_auth_event(
        db,
        AuthEventPayload::new(AuthEventType::SeedBlocked)
            .metadata(serde_json::json!({ "email": email, "reason": reason }))
            .at(now),
    )
    .await?;
    Ok(())
}

/// Promote an existing user to ADMIN when no active ADMIN exists yet.
///
/// Gated by `allow_seed_admin`. Every refusal after the email check is
/// recorded as SEED_BLOCKED.
pub async fn seed_admin_by_email(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    allow_seed_admin: bool,
    request: SeedAdminRequest,
) -> Result<SeedAdminResult> {
    require_auth(identity)?;

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(AppError::UserLookupFailed("Email is required".to_string()));
    }

    let _guard = db.begin_mutation().await;
    let now = now_millis();

    if !allow_seed_admin {
        log_seed_blocked(db, &email, "ALLOW_SEED_ADMIN=false", now).await?;
        return Err(AppError::Forbidden(
            "Seed admin is disabled by environment configuration".to_string(),
        ));
    }

    if db.find_active_admin().await?.is_some() {
        log_seed_blocked(db, &email, "Admin already exists", now).await?;
        return Err(AppError::Forbidden(
            "An active ADMIN already exists. Use setRole (ADMIN only) to manage roles."
                .to_string(),
        ));
    }

    let Some(target) = db.find_user_by_email(&email).await? else {
        log_seed_blocked(db, &email, "User not found", now).await?;
        return Err(AppError::UserLookupFailed(format!(
            "User with email {} not found",
            email
        )));
    };

    let current = db.get_active_role_assignment(&target.id).await?;
    let assignment = replace_active_role(db, &target.id, current, Role::Admin, now, None).await?;

    log_auth_event(
        db,
        AuthEventPayload::new(AuthEventType::SeedAdmin)
            .target(&target.id)
            .metadata(serde_json::json!({ "email": email }))
            .at(now),
    )
    .await?;

    tracing::info!(user_id = %target.id, email = %email, "First admin seeded");

    Ok(SeedAdminResult {
        seeded: true,
        user_id: target.id,
        email,
        role: Role::Admin,
        assigned_at: assignment.assigned_at,
    })
}

// ─── Queries ─────────────────────────────────────────────────

/// Whether any active ADMIN exists. Public.
pub async fn has_admin(db: &FirestoreDb) -> Result<bool> {
    Ok(db.find_active_admin().await?.is_some())
}

/// A user and their active role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRole {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub assigned_at: Option<i64>,
}

/// All users with their active role. Caller must hold ADMIN.
///
/// One role lookup per user, run with bounded concurrency; order follows
/// the user listing.
pub async fn list_users_with_roles(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<Vec<UserWithRole>> {
    guard_role(db, identity, Role::Admin).await?;

    let users = db.list_users().await?;

    stream::iter(users)
        .map(|user| async move {
            let active = db.get_active_role_assignment(&user.id).await?;
            Ok::<_, AppError>(UserWithRole {
                name: user.display_name(),
                email: Some(user.email.clone()),
                role: active.as_ref().map(|ra| ra.role),
                assigned_at: active.as_ref().map(|ra| ra.assigned_at),
                user_id: user.id,
            })
        })
        .buffered(MAX_CONCURRENT_ROLE_LOOKUPS)
        .try_collect()
        .await
}
