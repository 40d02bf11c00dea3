//! Database layer (Firestore, with an in-memory backend for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Identity-provider mirror (unique on provider_user_id)
    pub const AUTH_IDENTITIES: &str = "auth_identities";
    pub const ROLE_ASSIGNMENTS: &str = "role_assignments";
    /// Append-only audit trail
    pub const AUTH_EVENTS: &str = "auth_events";
}
