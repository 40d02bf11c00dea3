// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: bootstrap, whoami, and the caller's own user and role.

use crate::error::Result;
use crate::middleware::Caller;
use crate::models::{Role, User};
use crate::services::identity::{get_current_user_profile, require_auth};
use crate::services::rbac::guard_auth;
use crate::services::{bootstrap_on_first_login, get_active_role, whoami, BootstrapResult, WhoAmI};
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
        .route("/api/auth/bootstrap", post(bootstrap))
        .route("/api/auth/whoami", get(get_whoami))
        .route("/api/me", get(get_my_user))
        .route("/api/me/role", get(get_my_role))
}

/// Create or link the caller's local records on session start.
async fn bootstrap(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<BootstrapResult>> {
    let result = bootstrap_on_first_login(&state.db, caller.identity()).await?;
    Ok(Json(result))
}

/// Session summary; anonymous callers get the anonymous shape.
async fn get_whoami(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<WhoAmI>> {
    Ok(Json(whoami(&state.db, caller.identity()).await?))
}

#[derive(Serialize)]
pub struct MyUserResponse {
    /// None until the caller has bootstrapped
    pub user: Option<User>,
}

async fn get_my_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<MyUserResponse>> {
    require_auth(caller.identity())?;
    let user = get_current_user_profile(&state.db, caller.identity()).await?;
    Ok(Json(MyUserResponse { user }))
}

#[derive(Serialize)]
pub struct MyRoleResponse {
    pub role: Option<Role>,
}

async fn get_my_role(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<MyRoleResponse>> {
    guard_auth(caller.identity())?;
    let role = get_active_role(&state.db, caller.identity()).await?;
    Ok(Json(MyRoleResponse { role }))
}
