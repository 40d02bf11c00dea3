// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profile create/update/delete tests (in-memory store).

use fitclub_api::error::AppError;
use fitclub_api::models::user::DEFAULT_COUNTRY_CODE;
use fitclub_api::models::Role;
use fitclub_api::services::users::{
    create_user, delete_user, update_user, CreateUserRequest, UpdateUserRequest,
};
use fitclub_api::services::{bootstrap_on_first_login, Identity};

mod common;
use common::{bootstrap_admin, bootstrap_member, test_db_memory};

fn signup(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: "Carla".to_string(),
        last_name: "Mejia".to_string(),
        email: email.to_string(),
        contact_emergency_name: Some("Luis".to_string()),
        contact_emergency_phone: Some("3105550000".to_string()),
        birthday: "1995-03-10".to_string(),
        phone: "3104441111".to_string(),
        country_code: None,
    }
}

#[tokio::test]
async fn test_signup_then_bootstrap_links_profile() {
    let db = test_db_memory();

    let created = create_user(&db, signup("Carla@Gym.com")).await.unwrap();
    let user_id = created.user_id.unwrap();

    let user = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "carla@gym.com");
    assert_eq!(user.country_code, DEFAULT_COUNTRY_CODE);
    assert_eq!(user.clerk_id, None);

    let identity = Identity::new("ext_carla", Some("carla@gym.com"));
    let boot = bootstrap_on_first_login(&db, Some(&identity)).await.unwrap();
    assert_eq!(boot.user_id, user_id);
    assert_eq!(boot.role, Role::Client);
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let db = test_db_memory();
    create_user(&db, signup("dup@gym.com")).await.unwrap();

    let err = create_user(&db, signup("DUP@gym.com")).await.unwrap_err();

    assert_eq!(err.code(), "USER_CREATION_FAILED");
    assert!(err.to_string().contains("already exists"));
    assert_eq!(db.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_signup_invalid_email() {
    let db = test_db_memory();

    let err = create_user(&db, signup("not-an-email")).await.unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_owner_updates_profile() {
    let db = test_db_memory();
    let (member, boot) = bootstrap_member(&db, "ext_u", "u@gym.com").await;

    let result = update_user(
        &db,
        Some(&member),
        &boot.user_id,
        UpdateUserRequest {
            phone: Some("3001234567".to_string()),
            birthday: Some("1990-01-01".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(result.success);
    let user = db.get_user(&boot.user_id).await.unwrap().unwrap();
    assert_eq!(user.phone, "3001234567");
    assert_eq!(user.birthday, "1990-01-01");
    assert_eq!(user.email, "u@gym.com");
}

#[tokio::test]
async fn test_empty_update_reports_no_fields() {
    let db = test_db_memory();
    let (member, boot) = bootstrap_member(&db, "ext_u", "u@gym.com").await;

    let result = update_user(&db, Some(&member), &boot.user_id, UpdateUserRequest::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("No fields to update"));
}

#[tokio::test]
async fn test_other_member_cannot_edit_or_delete() {
    let db = test_db_memory();
    let (_, victim) = bootstrap_member(&db, "ext_v", "v@gym.com").await;
    let (other, _) = bootstrap_member(&db, "ext_o", "o@gym.com").await;

    let err = update_user(
        &db,
        Some(&other),
        &victim.user_id,
        UpdateUserRequest {
            name: Some("Hacked".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");

    let err = delete_user(&db, Some(&other), &victim.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");

    let user = db.get_user(&victim.user_id).await.unwrap().unwrap();
    assert_eq!(user.name, "");
}

#[tokio::test]
async fn test_admin_deletes_member() {
    let db = test_db_memory();
    let (admin, _) = bootstrap_admin(&db, "ext_admin", "admin@gym.com").await;
    let (_, member) = bootstrap_member(&db, "ext_u", "u@gym.com").await;

    let result = delete_user(&db, Some(&admin), &member.user_id).await.unwrap();

    assert!(result.success);
    assert!(db.get_user(&member.user_id).await.unwrap().is_none());
    // Role history stays behind
    assert!(!db
        .list_role_assignments_for_user(&member.user_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_mutations_on_missing_user() {
    let db = test_db_memory();
    let (admin, _) = bootstrap_admin(&db, "ext_admin", "admin@gym.com").await;

    let err = delete_user(&db, Some(&admin), "nope").await.unwrap_err();
    assert_eq!(err.code(), "USER_LOOKUP_FAILED");

    let err = delete_user(&db, None, "nope").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn test_update_cannot_take_another_members_email() {
    let db = test_db_memory();
    let taken = create_user(&db, signup("victim@gym.com")).await.unwrap();
    let (member, boot) = bootstrap_member(&db, "ext_att", "att@gym.com").await;

    let err = update_user(
        &db,
        Some(&member),
        &boot.user_id,
        UpdateUserRequest {
            email: Some("Victim@gym.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "USER_CREATION_FAILED");
    assert!(err.to_string().contains("already exists"));

    let holders: Vec<_> = db
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email == "victim@gym.com")
        .collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(Some(holders[0].id.clone()), taken.user_id);

    let user = db.get_user(&boot.user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "att@gym.com");
}

#[tokio::test]
async fn test_update_keeps_own_email_with_new_case() {
    let db = test_db_memory();
    let (member, boot) = bootstrap_member(&db, "ext_u", "u@gym.com").await;

    let result = update_user(
        &db,
        Some(&member),
        &boot.user_id,
        UpdateUserRequest {
            email: Some("U@Gym.com".to_string()),
            name: Some("Uma".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(result.success);
    let user = db.get_user(&boot.user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "u@gym.com");
    assert_eq!(user.name, "Uma");
}
