// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution: map an identity-provider session to a local user.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::{Role, User};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Caller identity as asserted by the identity provider's session token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Provider user id (`sub`)
    pub subject: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture_url: Option<String>,
}

impl Identity {
    /// Identity with just a subject and email.
    pub fn new(subject: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            subject: Some(subject.into()),
            email: email.map(str::to_string),
            ..Default::default()
        }
    }

    /// Non-empty subject, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    /// Lower-cased email, if any.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
    }

    /// Given and family name joined by a space.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Require an authenticated caller.
pub fn require_auth(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or(AppError::Unauthorized)
}

/// Look up the local user for an identity: provider id first, then email.
///
/// Read-only. Store errors are returned as-is.
pub async fn resolve_user(db: &FirestoreDb, identity: &Identity) -> Result<Option<User>> {
    if let Some(subject) = identity.subject() {
        if let Some(user) = db.find_user_by_clerk_id(subject).await? {
            return Ok(Some(user));
        }
    }

    match identity.normalized_email() {
        Some(email) => db.find_user_by_email(&email).await,
        None => Ok(None),
    }
}

/// Local profile of the caller, or `None` when anonymous or not yet bootstrapped.
pub async fn get_current_user_profile(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<Option<User>> {
    let Some(identity) = identity else {
        return Ok(None);
    };

    resolve_user(db, identity)
        .await
        .map_err(AppError::profile_lookup_failed)
}

/// Local profile of the caller; fails if it doesn't exist.
pub async fn require_current_user_profile(
    db: &FirestoreDb,
    identity: Option<&Identity>,
) -> Result<User> {
    get_current_user_profile(db, identity)
        .await?
        .ok_or(AppError::UserProfileNotFound)
}

/// Whether the caller is the provider subject that owns a resource.
pub fn has_permission(identity: Option<&Identity>, resource_subject: &str) -> bool {
    identity.and_then(Identity::subject) == Some(resource_subject)
}

/// Require ownership of a resource.
pub fn require_permission(identity: Option<&Identity>, resource_subject: &str) -> Result<()> {
    require_auth(identity)?;
    if !has_permission(identity, resource_subject) {
        return Err(AppError::Forbidden(
            "User does not have permission to access this resource".to_string(),
        ));
    }
    Ok(())
}

// ─── whoami ──────────────────────────────────────────────────

/// Current session as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    /// Provider subject, not the local user id
    pub user_id: Option<String>,
    pub role: Option<Role>,
    /// `"authenticated"` or `"anonymous"`
    pub status: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl WhoAmI {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: None,
            status: "anonymous".to_string(),
            email: None,
            name: None,
            avatar_url: None,
        }
    }
}

/// Describe the caller's session, including their active role.
pub async fn whoami(db: &FirestoreDb, identity: Option<&Identity>) -> Result<WhoAmI> {
    let Some(id) = identity else {
        return Ok(WhoAmI::anonymous());
    };

    let role = crate::services::rbac::get_active_role(db, identity).await?;

    Ok(WhoAmI {
        user_id: id.subject.clone(),
        role,
        status: "authenticated".to_string(),
        email: id.email.clone(),
        name: id.full_name(),
        avatar_url: id.picture_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let mut id = Identity::new("ext_1", None);
        assert_eq!(id.full_name(), None);

        id.given_name = Some("Ana".to_string());
        assert_eq!(id.full_name().as_deref(), Some("Ana"));

        id.family_name = Some("Ruiz".to_string());
        assert_eq!(id.full_name().as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn test_normalized_email() {
        let id = Identity::new("ext_1", Some(" A@B.com"));
        assert_eq!(id.normalized_email().as_deref(), Some("a@b.com"));

        let id = Identity::new("ext_1", Some(""));
        assert_eq!(id.normalized_email(), None);
    }

    #[test]
    fn test_empty_subject_is_missing() {
        let id = Identity::new("", None);
        assert_eq!(id.subject(), None);
    }

    #[test]
    fn test_permission_checks() {
        let id = Identity::new("ext_1", None);
        assert!(has_permission(Some(&id), "ext_1"));
        assert!(!has_permission(Some(&id), "ext_2"));
        assert!(!has_permission(None, "ext_1"));

        assert!(require_permission(Some(&id), "ext_1").is_ok());
        assert!(matches!(
            require_permission(Some(&id), "ext_2"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            require_permission(None, "ext_1"),
            Err(AppError::Unauthorized)
        ));
    }
}
