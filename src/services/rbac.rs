// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role lookup and enforcement for privileged operations.
//!
//! Every check costs one indexed point query (user id + active flag) on top
//! of resolving the caller's profile.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Role, RoleAssignment};
use crate::services::identity::{get_current_user_profile, require_auth, Identity};

/// The caller's active role assignment, if they have a profile and a role.
pub async fn get_active_role_assignment(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<Option<RoleAssignment>> {
    require_auth(identity)?;
    let Some(me) = get_current_user_profile(db, identity).await? else {
        return Ok(None);
    };

    db.get_active_role_assignment(&me.id).await
}

/// The caller's active role.
pub async fn get_active_role(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<Option<Role>> {
    Ok(get_active_role_assignment(db, identity)
        .await?
        .map(|ra| ra.role))
}

/// Check that `current` is exactly `required`.
pub fn check_role(current: Option<Role>, required: Role) -> Result<()> {
    match current {
        None => Err(AppError::Forbidden("No active role assigned".to_string())),
        Some(role) if role == required => Ok(()),
        Some(_) => Err(AppError::Forbidden(format!("Role {} required", required))),
    }
}

/// Check that `current` is one of `allowed`.
pub fn check_any_role(current: Option<Role>, allowed: &[Role]) -> Result<()> {
    match current {
        None => Err(AppError::Forbidden("No active role assigned".to_string())),
        Some(role) if allowed.contains(&role) => Ok(()),
        Some(_) => {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            Err(AppError::Forbidden(format!(
                "One of roles [{}] is required",
                names.join(", ")
            )))
        }
    }
}

/// Fail with FORBIDDEN unless the caller's active role is `required`.
pub async fn enforce_role(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    required: Role,
) -> Result<()> {
    let current = get_active_role(db, identity).await?;
    check_role(current, required)
}

/// Fail with FORBIDDEN unless the caller's active role is in `allowed`.
pub async fn enforce_any_role(
    db: &FirestoreDb,
    identity: Option<&Identity>,
    allowed: &[Role],
) -> Result<()> {
    let current = get_active_role(db, identity).await?;
    check_any_role(current, allowed)
}

/// Require authentication.
pub fn guard_auth(identity: Option<&Identity>) -> Result<&Identity> {
    require_auth(identity)
}

/// Require authentication and a specific role.
pub async fn guard_role<'a>(
    db: &FirestoreDb,
    identity: Option<&'a Identity>,
    role: Role,
) -> Result<&'a Identity> {
    let caller = require_auth(identity)?;
    enforce_role(db, identity, role).await?;
    Ok(caller)
}

/// Require authentication and any of the given roles.
pub async fn guard_any_role<'a>(
    db: &FirestoreDb,
    identity: Option<&'a Identity>,
    roles: &[Role],
) -> Result<&'a Identity> {
    let caller = require_auth(identity)?;
    enforce_any_role(db, identity, roles).await?;
    Ok(caller)
}
