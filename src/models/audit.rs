// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audit trail for authentication and RBAC changes.

use serde::{Deserialize, Serialize};

/// Kinds of audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventType {
    Login,
    Bootstrap,
    RoleChanged,
    SeedAdmin,
    SeedBlocked,
}

impl AuthEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventType::Login => "LOGIN",
            AuthEventType::Bootstrap => "BOOTSTRAP",
            AuthEventType::RoleChanged => "ROLE_CHANGED",
            AuthEventType::SeedAdmin => "SEED_ADMIN",
            AuthEventType::SeedBlocked => "SEED_BLOCKED",
        }
    }
}

/// Append-only audit record stored in `auth_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: AuthEventType,
    /// No actor for the first admin seed or blocked seeds
    #[serde(default)]
    pub actor_user_id: Option<String>,
    #[serde(default)]
    pub target_user_id: Option<String>,
    /// Free-form details (email, oldRole, newRole, reason, ...)
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Epoch ms
    pub created_at: i64,
}
