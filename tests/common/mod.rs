// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitclub_api::config::{Config, IdentityKey};
use fitclub_api::db::FirestoreDb;
use fitclub_api::middleware::auth::SessionDecoder;
use fitclub_api::routes::create_router;
use fitclub_api::services::roles::{seed_admin_by_email, SeedAdminRequest};
use fitclub_api::services::{bootstrap_on_first_login, BootstrapResult, Identity};
use fitclub_api::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create an in-memory database.
#[allow(dead_code)]
pub fn test_db_memory() -> FirestoreDb {
    FirestoreDb::new_in_memory()
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), test_db_memory())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let session_decoder =
        SessionDecoder::from_config(&config).expect("test config has a valid key");

    let state = Arc::new(AppState {
        config,
        db,
        session_decoder,
    });

    (create_router(state.clone()), state)
}

/// Create a session token signed with the test identity key.
#[allow(dead_code)]
pub fn create_test_jwt(config: &Config, subject: &str, email: Option<&str>) -> String {
    let IdentityKey::Secret(secret) = &config.identity_key else {
        panic!("test config uses a shared secret");
    };

    let exp = chrono::Utc::now().timestamp() + 3600;
    let mut claims = serde_json::json!({ "sub": subject, "exp": exp });
    if let Some(email) = email {
        claims["email"] = serde_json::Value::from(email);
    }

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// Unique suffix for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Bootstrap a member and return their identity and bootstrap result.
#[allow(dead_code)]
pub async fn bootstrap_member(
    db: &FirestoreDb,
    subject: &str,
    email: &str,
) -> (Identity, BootstrapResult) {
    let identity = Identity::new(subject, Some(email));
    let result = bootstrap_on_first_login(db, Some(&identity))
        .await
        .expect("bootstrap should succeed");
    (identity, result)
}

/// Bootstrap a member and seed them as the first admin.
#[allow(dead_code)]
pub async fn bootstrap_admin(db: &FirestoreDb, subject: &str, email: &str) -> (Identity, String) {
    let (identity, result) = bootstrap_member(db, subject, email).await;
    seed_admin_by_email(
        db,
        Some(&identity),
        true,
        SeedAdminRequest {
            email: email.to_string(),
        },
    )
    .await
    .expect("admin seed should succeed");
    (identity, result.user_id)
}
