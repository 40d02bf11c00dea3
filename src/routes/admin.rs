// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role administration routes.
//!
//! `setRole` and the user listing require an active ADMIN; the seed and
//! `hasAdmin` are the bootstrap path for the very first admin.

use crate::error::Result;
use crate::middleware::Caller;
use crate::services::roles::{
    SeedAdminRequest, SeedAdminResult, SetRoleRequest, SetRoleResult, UserWithRole,
};
use crate::services::{has_admin, list_users_with_roles, seed_admin_by_email, set_role};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/roles", post(post_set_role))
        .route("/api/admin/seed", post(post_seed_admin))
        .route("/api/admin/users", get(get_users_with_roles))
        .route("/api/admin/exists", get(get_has_admin))
}

async fn post_set_role(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<SetRoleResult>> {
    Ok(Json(set_role(&state.db, caller.identity(), request).await?))
}

async fn post_seed_admin(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<SeedAdminRequest>,
) -> Result<Json<SeedAdminResult>> {
    let result = seed_admin_by_email(
        &state.db,
        caller.identity(),
        state.config.allow_seed_admin,
        request,
    )
    .await?;
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct UsersWithRolesResponse {
    pub users: Vec<UserWithRole>,
}

async fn get_users_with_roles(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<UsersWithRolesResponse>> {
    let users = list_users_with_roles(&state.db, caller.identity()).await?;
    Ok(Json(UsersWithRolesResponse { users }))
}

#[derive(Serialize)]
pub struct HasAdminResponse {
    pub exists: bool,
}

async fn get_has_admin(State(state): State<Arc<AppState>>) -> Result<Json<HasAdminResponse>> {
    Ok(Json(HasAdminResponse {
        exists: has_admin(&state.db).await?,
    }))
}
