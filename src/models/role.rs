// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roles and role assignments (RBAC).

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The three flat roles a member can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "apps/native/lib/generated/")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Trainer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Trainer => "TRAINER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role granted to a user, stored in `role_assignments`.
///
/// History is kept by flipping `active` to false; rows are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    /// Epoch ms
    pub assigned_at: i64,
    /// Admin who granted the role; none for defaults and the first seed
    #[serde(default)]
    pub assigned_by_user_id: Option<String>,
    pub active: bool,
}

impl RoleAssignment {
    /// New active assignment with a fresh document id.
    pub fn new_active(
        user_id: &str,
        role: Role,
        assigned_at: i64,
        assigned_by_user_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            role,
            assigned_at,
            assigned_by_user_id,
            active: true,
        }
    }
}
