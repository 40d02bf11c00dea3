// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-facing user summary and the mapping from stored users.

use crate::models::role::Role;
use crate::models::user::{User, IDENTITY_PROVIDER};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "phoneE164", skip_serializing_if = "Option::is_none")]
    pub phone_e164: Option<String>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    /// `YYYY-MM-DD`, or empty when unknown
    pub birth_date: String,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub provider: String,
    pub provider_user_id: Option<String>,
    pub email_from_provider: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub last_login_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentSummary {
    pub role: Option<Role>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub assigned_at: Option<i64>,
    pub assigned_by_user_id: Option<String>,
    pub active: bool,
}

/// Summary view of a member returned to the mobile client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    pub status: String,
    pub role: Option<Role>,
    pub clerk_id: Option<String>,
    pub person: Person,
    pub contacts: Vec<Contact>,
    pub identity: IdentitySummary,
    /// Sessions live with the identity provider.
    #[cfg_attr(feature = "binding-generation", ts(type = "null"))]
    pub active_session: Option<()>,
    pub current_role_assignment: RoleAssignmentSummary,
}

/// Age in whole years for a `YYYY-MM-DD` birth date, as of today (local time).
pub fn calculate_age(birth_date: Option<&str>) -> Option<u32> {
    calculate_age_on(birth_date, chrono::Local::now().date_naive())
}

/// Age in whole years as of `today`.
///
/// Returns `None` for missing or malformed dates, zero components, and
/// dates in the future.
pub fn calculate_age_on(birth_date: Option<&str>, today: NaiveDate) -> Option<u32> {
    let raw = birth_date?.trim();
    if raw.is_empty() {
        return None;
    }

    let mut parts = raw.splitn(3, '-').map(leading_int);
    let year = parts.next().flatten()?;
    let month = parts.next().flatten()?;
    let day = parts.next().flatten()?;
    if year == 0 || month == 0 || day == 0 {
        return None;
    }

    let mut age = today.year() - year;
    let (mm, dd) = (today.month() as i32, today.day() as i32);
    if mm < month || (mm == month && dd < day) {
        age -= 1;
    }

    u32::try_from(age).ok()
}

/// Integer value of the leading digits, ignoring anything after them
/// (`"01T00:00:00"` is 1).
fn leading_int(part: &str) -> Option<i32> {
    let part = part.trim_start();
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

/// Map a stored user to the client summary.
///
/// The caller supplies the active role and last login, since neither lives
/// on the user document.
pub fn map_user_to_summary(
    user: &User,
    role: Option<Role>,
    last_login_at: Option<i64>,
) -> UserSummary {
    let birthday = (!user.birthday.is_empty()).then_some(user.birthday.as_str());

    let person = Person {
        first_name: user.name.clone(),
        last_name: user.last_name.clone(),
        avatar_url: None,
        birth_date: user.birthday.clone(),
        age: calculate_age(birthday),
    };

    let mut contacts = Vec::new();
    if !user.email.is_empty() {
        contacts.push(Contact {
            contact_type: ContactType::Email,
            is_primary: true,
            email: Some(user.email.clone()),
            phone_e164: None,
            verified: false,
        });
    }
    if !user.phone.is_empty() {
        contacts.push(Contact {
            contact_type: ContactType::Phone,
            is_primary: true,
            email: None,
            phone_e164: Some(format!("{}{}", user.country_code, user.phone)),
            verified: false,
        });
    }

    let email = (!user.email.is_empty()).then(|| user.email.clone());

    UserSummary {
        id: user.id.clone(),
        created_at: user.created_at,
        status: "active".to_string(),
        role,
        clerk_id: user.clerk_id.clone(),
        person,
        contacts,
        identity: IdentitySummary {
            provider: IDENTITY_PROVIDER.to_string(),
            provider_user_id: user.clerk_id.clone(),
            email_from_provider: email,
            last_login_at,
        },
        active_session: None,
        current_role_assignment: RoleAssignmentSummary {
            role,
            assigned_at: None,
            assigned_by_user_id: None,
            active: role.is_some(),
        },
    }
}
