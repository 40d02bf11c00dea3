// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (member profiles)
//! - Auth identities (identity-provider mirror)
//! - Role assignments (RBAC, with history)
//! - Auth events (append-only audit trail)
//!
//! The same handle can run against an in-memory store for tests and local
//! development.

use crate::db::collections;
use crate::db::memory::MemoryStore;
use crate::error::AppError;
use crate::models::{AuthEvent, AuthEventType, AuthIdentity, RoleAssignment, User};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
    /// Held for the duration of each mutation so that check-then-write
    /// sequences don't interleave within this process.
    mutation_lock: Arc<Mutex<()>>,
}

impl FirestoreDb {
    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self::with_backend(Backend::Firestore(client)))
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self::with_backend(Backend::Firestore(client)))
    }

    /// Create an in-memory store (tests and local development).
    pub fn new_in_memory() -> Self {
        tracing::debug!("Using in-memory document store");
        Self::with_backend(Backend::Memory(Arc::new(MemoryStore::new())))
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self::with_backend(Backend::Offline)
    }

    /// Serialize a read-modify-write sequence against other mutations.
    pub async fn begin_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation_lock.lock().await
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        match &self.backend {
            Backend::Firestore(client) => Ok(client),
            _ => Err(AppError::Database(
                "Database not connected (offline mode)".to_string(),
            )),
        }
    }

    fn memory(&self) -> Option<&MemoryStore> {
        match &self.backend {
            Backend::Memory(store) => Some(store),
            _ => None,
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.get_user(user_id));
        }

        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by identity-provider subject.
    pub async fn find_user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.find_user_by_clerk_id(clerk_id));
        }

        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("clerk_id").eq(clerk_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Find a user by (already normalized) email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.find_user_by_email(email));
        }

        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        if let Some(mem) = self.memory() {
            mem.upsert_user(user);
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List every user, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.list_users());
        }

        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user profile.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        if let Some(mem) = self.memory() {
            mem.delete_user(user_id);
            return Ok(());
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Identity Mirror Operations ──────────────────────────────

    /// Get the identity mirror for a provider subject.
    ///
    /// Mirrors are stored under the subject as document id, so this is a
    /// point read.
    pub async fn find_identity_by_provider_user_id(
        &self,
        provider_user_id: &str,
    ) -> Result<Option<AuthIdentity>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.find_identity_by_provider_user_id(provider_user_id));
        }

        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::AUTH_IDENTITIES)
            .obj()
            .one(provider_user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of mirror documents for a provider subject (should be 0 or 1).
    pub async fn count_identities(&self, provider_user_id: &str) -> Result<usize, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.count_identities_for_provider_user(provider_user_id));
        }

        let identities: Vec<AuthIdentity> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::AUTH_IDENTITIES)
            .filter(|q| q.for_all([q.field("provider_user_id").eq(provider_user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(identities.len())
    }

    /// Create or update an identity mirror (document id = provider subject).
    pub async fn upsert_identity(&self, identity: &AuthIdentity) -> Result<(), AppError> {
        if let Some(mem) = self.memory() {
            mem.upsert_identity(identity);
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::AUTH_IDENTITIES)
            .document_id(&identity.provider_user_id)
            .object(identity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Role Assignment Operations ──────────────────────────────

    /// Get a user's active role assignment (index: user_id + active).
    pub async fn get_active_role_assignment(
        &self,
        user_id: &str,
    ) -> Result<Option<RoleAssignment>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.get_active_role_assignment(user_id));
        }

        let rows: Vec<RoleAssignment> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ROLE_ASSIGNMENTS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("active").eq(true),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Any active ADMIN assignment in the system.
    pub async fn find_active_admin(&self) -> Result<Option<RoleAssignment>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.find_active_admin());
        }

        let rows: Vec<RoleAssignment> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ROLE_ASSIGNMENTS)
            .filter(|q| {
                q.for_all([
                    q.field("role").eq("ADMIN"),
                    q.field("active").eq(true),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Create or update a role assignment.
    pub async fn upsert_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> Result<(), AppError> {
        if let Some(mem) = self.memory() {
            mem.upsert_role_assignment(assignment);
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ROLE_ASSIGNMENTS)
            .document_id(&assignment.id)
            .object(assignment)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Role history for a user, oldest first (index: user_id + assigned_at).
    pub async fn list_role_assignments_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RoleAssignment>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.list_role_assignments_for_user(user_id));
        }

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROLE_ASSIGNMENTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([(
                "assigned_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Auth Event Operations ───────────────────────────────────

    /// Append an audit event.
    pub async fn insert_auth_event(&self, event: &AuthEvent) -> Result<(), AppError> {
        if let Some(mem) = self.memory() {
            mem.insert_auth_event(event);
            return Ok(());
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::AUTH_EVENTS)
            .document_id(&event.id)
            .object(event)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Events targeting a user, oldest first (index: target_user_id + created_at).
    pub async fn list_auth_events_for_target(
        &self,
        user_id: &str,
    ) -> Result<Vec<AuthEvent>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.list_auth_events_for_target(user_id));
        }

        self.get_client()?
            .fluent()
            .select()
            .from(collections::AUTH_EVENTS)
            .filter(|q| q.for_all([q.field("target_user_id").eq(user_id)]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events of one type, oldest first (index: type + created_at).
    pub async fn list_auth_events_by_type(
        &self,
        event_type: AuthEventType,
    ) -> Result<Vec<AuthEvent>, AppError> {
        if let Some(mem) = self.memory() {
            return Ok(mem.list_auth_events_by_type(event_type));
        }

        self.get_client()?
            .fluent()
            .select()
            .from(collections::AUTH_EVENTS)
            .filter(|q| q.for_all([q.field("type").eq(event_type.as_str())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
