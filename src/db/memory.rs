// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store mirroring the Firestore collections.
//!
//! Used by tests and for running the API locally without the emulator.
//! Lookups scan the collection; the data sets are small.

use crate::models::{AuthEvent, AuthEventType, AuthIdentity, Role, RoleAssignment, User};
use dashmap::DashMap;

/// Collections keyed by document id.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    identities: DashMap<String, AuthIdentity>,
    role_assignments: DashMap<String, RoleAssignment>,
    auth_events: DashMap<String, AuthEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Users ───────────────────────────────────────────────────

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id).map(|u| u.value().clone())
    }

    pub fn find_user_by_clerk_id(&self, clerk_id: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.clerk_id.as_deref() == Some(clerk_id))
            .map(|u| u.value().clone())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone())
    }

    pub fn upsert_user(&self, user: &User) {
        self.users.insert(user.id.clone(), user.clone());
    }

    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    pub fn delete_user(&self, user_id: &str) {
        self.users.remove(user_id);
    }

    // ─── Identities ──────────────────────────────────────────────

    pub fn find_identity_by_provider_user_id(
        &self,
        provider_user_id: &str,
    ) -> Option<AuthIdentity> {
        self.identities
            .get(provider_user_id)
            .map(|i| i.value().clone())
    }

    /// Keyed by provider subject, so one mirror per subject.
    pub fn upsert_identity(&self, identity: &AuthIdentity) {
        self.identities
            .insert(identity.provider_user_id.clone(), identity.clone());
    }

    pub fn count_identities_for_provider_user(&self, provider_user_id: &str) -> usize {
        self.identities
            .iter()
            .filter(|i| i.provider_user_id == provider_user_id)
            .count()
    }

    // ─── Role Assignments ────────────────────────────────────────

    pub fn get_active_role_assignment(&self, user_id: &str) -> Option<RoleAssignment> {
        self.role_assignments
            .iter()
            .find(|ra| ra.user_id == user_id && ra.active)
            .map(|ra| ra.value().clone())
    }

    pub fn find_active_admin(&self) -> Option<RoleAssignment> {
        self.role_assignments
            .iter()
            .find(|ra| ra.role == Role::Admin && ra.active)
            .map(|ra| ra.value().clone())
    }

    pub fn upsert_role_assignment(&self, assignment: &RoleAssignment) {
        self.role_assignments
            .insert(assignment.id.clone(), assignment.clone());
    }

    pub fn list_role_assignments_for_user(&self, user_id: &str) -> Vec<RoleAssignment> {
        let mut rows: Vec<RoleAssignment> = self
            .role_assignments
            .iter()
            .filter(|ra| ra.user_id == user_id)
            .map(|ra| ra.value().clone())
            .collect();
        rows.sort_by_key(|ra| ra.assigned_at);
        rows
    }

    // ─── Auth Events ─────────────────────────────────────────────

    pub fn insert_auth_event(&self, event: &AuthEvent) {
        self.auth_events.insert(event.id.clone(), event.clone());
    }

    pub fn list_auth_events_for_target(&self, user_id: &str) -> Vec<AuthEvent> {
        self.sorted_events(|e| e.target_user_id.as_deref() == Some(user_id))
    }

    pub fn list_auth_events_by_type(&self, event_type: AuthEventType) -> Vec<AuthEvent> {
        self.sorted_events(|e| e.event_type == event_type)
    }

    fn sorted_events<F>(&self, predicate: F) -> Vec<AuthEvent>
    where
        F: Fn(&AuthEvent) -> bool,
    {
        let mut events: Vec<AuthEvent> = self
            .auth_events
            .iter()
            .filter(|e| predicate(e.value()))
            .map(|e| e.value().clone())
            .collect();
        events.sort_by_key(|e| e.created_at);
        events
    }
}
