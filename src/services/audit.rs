// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audit logging into `auth_events`.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{AuthEvent, AuthEventType};
use crate::time_utils::now_millis;

/// Event to append. `created_at` defaults to now.
#[derive(Debug, Clone)]
pub struct AuthEventPayload {
    pub event_type: AuthEventType,
    pub actor_user_id: Option<String>,
    pub target_user_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<i64>,
}

impl AuthEventPayload {
    pub fn new(event_type: AuthEventType) -> Self {
        Self {
            event_type,
            actor_user_id: None,
            target_user_id: None,
            metadata: None,
            created_at: None,
        }
    }

    pub fn actor(mut self, user_id: &str) -> Self {
        self.actor_user_id = Some(user_id.to_string());
        self
    }

    pub fn target(mut self, user_id: &str) -> Self {
        self.target_user_id = Some(user_id.to_string());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Append an audit event. Events are never updated or deleted.
pub async fn log_auth_event(db: &FirestoreDb, payload: AuthEventPayload) -> Result<AuthEvent> {
    let event = AuthEvent {
        id: uuid::Uuid::new_v4().to_string(),
        event_type: payload.event_type,
        actor_user_id: payload.actor_user_id,
        target_user_id: payload.target_user_id,
        metadata: payload.metadata,
        created_at: payload.created_at.unwrap_or_else(now_millis),
    };

    db.insert_auth_event(&event).await?;

    tracing::debug!(
        event_type = event.event_type.as_str(),
        actor = ?event.actor_user_id,
        target = ?event.target_user_id,
        "Auth event recorded"
    );

    Ok(event)
}
