// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-login bootstrap.
//!
//! Runs on every authenticated session start and is idempotent:
//! 1. Resolve or create the local user (provider id, then email)
//! 2. Upsert the identity mirror in `auth_identities`
//! 3. Assign CLIENT if the user has no active role
//! 4. Record a BOOTSTRAP audit event

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::{DEFAULT_COUNTRY_CODE, IDENTITY_PROVIDER};
use crate::models::{
    map_user_to_summary, AuthEventType, AuthIdentity, Role, RoleAssignment, User, UserSummary,
};
use crate::services::audit::{log_auth_event, AuthEventPayload};
use crate::services::identity::{require_auth, resolve_user, Identity};
use crate::time_utils::now_millis;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Result of a bootstrap call.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResult {
    pub user_id: String,
    /// True when the user had no active role before this call
    pub created: bool,
    pub status: String,
    pub role: Role,
    pub user: UserSummary,
}

/// Reconcile the caller's provider session with local records.
///
/// Any failure after authentication is reported as `USER_CREATION_FAILED`
/// with the underlying error as its cause. Writes made before the failure
/// are not rolled back.
pub async fn bootstrap_on_first_login(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<BootstrapResult> {
    let identity = require_auth(identity)?;

    let _guard = db.begin_mutation().await;
    reconcile(db, identity)
        .await
        .map_err(|e| AppError::creation_failed("Failed to bootstrap user", e))
}

async fn reconcile(db: &FirestoreDb, identity: &Identity) -> Result<BootstrapResult> {
    let subject = identity.subject();
    let email = identity.normalized_email().unwrap_or_default();
    let now = now_millis();

    // 1. Resolve or create the local user
    let user = match resolve_user(db, identity).await? {
        Some(mut user) => {
            let mut changed = false;
            if let Some(subject) = subject {
                if user.clerk_id.as_deref() != Some(subject) {
                    user.clerk_id = Some(subject.to_string());
                    changed = true;
                }
            }
            if !email.is_empty() && user.email != email {
                user.email = email.clone();
                changed = true;
            }
            if changed {
                db.upsert_user(&user).await?;
                tracing::debug!(user_id = %user.id, "Linked existing user to provider identity");
            }
            user
        }
        None => {
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                name: identity.given_name.clone().unwrap_or_default(),
                last_name: identity.family_name.clone().unwrap_or_default(),
                email: email.clone(),
                contact_emergency_name: String::new(),
                contact_emergency_phone: String::new(),
                birthday: String::new(),
                phone: String::new(),
                country_code: DEFAULT_COUNTRY_CODE.to_string(),
                clerk_id: subject.map(str::to_string),
                created_at: now,
            };
            db.upsert_user(&user).await?;
            tracing::info!(user_id = %user.id, email = %email, "Created local user");
            user
        }
    };

    // 2. Identity mirror; the provider subject is the document id
    let Some(subject) = subject else {
        return Err(AppError::UserCreationFailed {
            message: "Missing identity provider subject".to_string(),
            cause: None,
        });
    };

    let mirror = match db.find_identity_by_provider_user_id(subject).await? {
        Some(mut existing) => {
            existing.user_id = user.id.clone();
            existing.email_from_provider = identity.email.clone();
            existing.last_login_at = Some(now);
            existing
        }
        None => AuthIdentity {
            id: subject.to_string(),
            user_id: user.id.clone(),
            provider: IDENTITY_PROVIDER.to_string(),
            provider_user_id: subject.to_string(),
            email_from_provider: identity.email.clone(),
            last_login_at: Some(now),
        },
    };
    db.upsert_identity(&mirror).await?;

    // 3. Default role
    let active = db.get_active_role_assignment(&user.id).await?;
    let created = active.is_none();
    let role = match active {
        Some(assignment) => assignment.role,
        None => {
            let assignment = RoleAssignment::new_active(&user.id, Role::Client, now, None);
            db.upsert_role_assignment(&assignment).await?;
            assignment.role
        }
    };

    // 4. Audit
    log_auth_event(
        db,
        AuthEventPayload::new(AuthEventType::Bootstrap)
            .actor(&user.id)
            .target(&user.id)
            .metadata(serde_json::json!({ "email": email }))
            .at(now),
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        role = %role,
        first_login = created,
        "User bootstrapped"
    );

    Ok(BootstrapResult {
        user_id: user.id.clone(),
        created,
        status: "active".to_string(),
        role,
        user: map_user_to_summary(&user, Some(role), Some(now)),
    })
}
