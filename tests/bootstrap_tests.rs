// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-login bootstrap tests (in-memory store).

use fitclub_api::error::AppError;
use fitclub_api::models::user::DEFAULT_COUNTRY_CODE;
use fitclub_api::models::{AuthEventType, AuthIdentity, Role, RoleAssignment, User};
use fitclub_api::services::{bootstrap_on_first_login, Identity};

mod common;
use common::{bootstrap_member, test_db_memory};

fn legacy_user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: "Legacy".to_string(),
        last_name: "Member".to_string(),
        email: email.to_string(),
        contact_emergency_name: "Mom".to_string(),
        contact_emergency_phone: "3009998888".to_string(),
        birthday: "1990-05-20".to_string(),
        phone: "3001234567".to_string(),
        country_code: "+57".to_string(),
        clerk_id: None,
        created_at: 1_600_000_000_000,
    }
}

#[tokio::test]
async fn test_first_bootstrap_creates_all_records() {
    let db = test_db_memory();
    let identity = Identity::new("ext_1", Some("a@b.com"));

    let result = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert!(result.created);
    assert_eq!(result.role, Role::Client);
    assert_eq!(result.status, "active");

    let user = db.get_user(&result.user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.clerk_id.as_deref(), Some("ext_1"));
    assert_eq!(user.phone, "");
    assert_eq!(user.birthday, "");
    assert_eq!(user.country_code, DEFAULT_COUNTRY_CODE);

    let mirror = db
        .find_identity_by_provider_user_id("ext_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mirror.id, "ext_1");
    assert_eq!(mirror.user_id, user.id);
    assert_eq!(mirror.provider, "clerk");
    assert!(mirror.last_login_at.is_some());

    let roles = db.list_role_assignments_for_user(&user.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role, Role::Client);
    assert!(roles[0].active);
    assert_eq!(roles[0].assigned_by_user_id, None);

    let events = db.list_auth_events_for_target(&user.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, AuthEventType::Bootstrap);
    assert_eq!(events[0].actor_user_id.as_deref(), Some(user.id.as_str()));
    assert_eq!(events[0].metadata.as_ref().unwrap()["email"], "a@b.com");
}

#[tokio::test]
async fn test_repeat_bootstrap_is_idempotent() {
    let db = test_db_memory();
    let (identity, first) = bootstrap_member(&db, "ext_1", "a@b.com").await;

    let second = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();
    let third = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert!(!second.created);
    assert!(!third.created);
    assert_eq!(second.user_id, first.user_id);
    assert_eq!(third.role, Role::Client);

    assert_eq!(db.count_identities("ext_1").await.unwrap(), 1);

    let roles = db.list_role_assignments_for_user(&first.user_id).await.unwrap();
    assert_eq!(roles.iter().filter(|r| r.active).count(), 1);
    assert_eq!(roles.len(), 1);

    // One BOOTSTRAP event per call
    let events = db.list_auth_events_by_type(AuthEventType::Bootstrap).await.unwrap();
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_bootstrap_keeps_existing_role() {
    let db = test_db_memory();
    let (identity, first) = bootstrap_member(&db, "ext_1", "a@b.com").await;

    // Promote directly in the store
    let mut current = db
        .get_active_role_assignment(&first.user_id)
        .await
        .unwrap()
        .unwrap();
    current.active = false;
    db.upsert_role_assignment(&current).await.unwrap();
    db.upsert_role_assignment(&RoleAssignment::new_active(
        &first.user_id,
        Role::Trainer,
        current.assigned_at + 1,
        None,
    ))
    .await
    .unwrap();

    let again = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert!(!again.created);
    assert_eq!(again.role, Role::Trainer);
    assert_eq!(again.user.role, Some(Role::Trainer));
}

#[tokio::test]
async fn test_bootstrap_links_existing_user_by_email() {
    let db = test_db_memory();
    db.upsert_user(&legacy_user("legacy_1", "jane@example.com"))
        .await
        .unwrap();

    let identity = Identity::new("ext_jane", Some("Jane@Example.com"));
    let result = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert_eq!(result.user_id, "legacy_1");
    assert!(result.created);

    let user = db.get_user("legacy_1").await.unwrap().unwrap();
    assert_eq!(user.clerk_id.as_deref(), Some("ext_jane"));
    // Profile fields survive linking
    assert_eq!(user.phone, "3001234567");
    assert_eq!(user.name, "Legacy");

    assert_eq!(result.user.person.birth_date, "1990-05-20");
    assert!(result.user.person.age.is_some());
}

#[tokio::test]
async fn test_bootstrap_updates_changed_email() {
    let db = test_db_memory();
    let (_, first) = bootstrap_member(&db, "ext_1", "old@b.com").await;

    let identity = Identity::new("ext_1", Some("NEW@b.com"));
    let result = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert_eq!(result.user_id, first.user_id);
    let user = db.get_user(&first.user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "new@b.com");

    let mirror = db
        .find_identity_by_provider_user_id("ext_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mirror.email_from_provider.as_deref(), Some("NEW@b.com"));
}

#[tokio::test]
async fn test_bootstrap_uses_provider_names() {
    let db = test_db_memory();
    let identity = Identity {
        given_name: Some("Ana".to_string()),
        family_name: Some("Ruiz".to_string()),
        ..Identity::new("ext_ana", Some("ana@example.com"))
    };

    let result = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert_eq!(result.user.person.first_name, "Ana");
    assert_eq!(result.user.person.last_name, "Ruiz");
    assert_eq!(result.user.identity.provider_user_id.as_deref(), Some("ext_ana"));
}

#[tokio::test]
async fn test_bootstrap_requires_authentication() {
    let db = test_db_memory();

    let err = bootstrap_on_first_login(&db, None).await.unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
    assert!(db.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_without_subject_fails_after_creating_user() {
    let db = test_db_memory();
    let identity = Identity {
        subject: None,
        email: Some("nosub@example.com".to_string()),
        ..Default::default()
    };

    let err = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap_err();

    assert_eq!(err.code(), "USER_CREATION_FAILED");
    assert!(err.to_string().contains("Missing identity provider subject"));

    // No rollback: the local user exists but has no mirror or role
    let user = db.find_user_by_email("nosub@example.com").await.unwrap().unwrap();
    assert!(db
        .get_active_role_assignment(&user.id)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .list_auth_events_for_target(&user.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_bootstrap_store_failure_is_creation_failed() {
    let db = fitclub_api::db::FirestoreDb::new_mock();
    let identity = Identity::new("ext_1", Some("a@b.com"));

    let err = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap_err();

    assert_eq!(err.code(), "USER_CREATION_FAILED");
    let cause = std::error::Error::source(&err).expect("cause should be attached");
    assert!(cause.to_string().contains("offline"));
}

#[tokio::test]
async fn test_identity_mirror_is_unique_per_subject() {
    let db = test_db_memory();
    let (_, first) = bootstrap_member(&db, "ext_1", "a@b.com").await;

    // A second writer that built its own mirror for the same subject
    let stale = AuthIdentity {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: "someone_else".to_string(),
        provider: "clerk".to_string(),
        provider_user_id: "ext_1".to_string(),
        email_from_provider: None,
        last_login_at: None,
    };
    db.upsert_identity(&stale).await.unwrap();
    assert_eq!(db.count_identities("ext_1").await.unwrap(), 1);

    let identity = Identity::new("ext_1", Some("a@b.com"));
    bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();

    assert_eq!(db.count_identities("ext_1").await.unwrap(), 1);
    let mirror = db
        .find_identity_by_provider_user_id("ext_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mirror.user_id, first.user_id);
}
