// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profile routes.

use crate::error::Result;
use crate::middleware::Caller;
use crate::services::users::{
    create_user, delete_user, update_user, CreateUserRequest, UpdateUserRequest,
    UserMutationResult,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{patch, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(post_user))
        .route("/api/users/{id}", patch(patch_user).delete(remove_user))
}

/// Sign-up.
async fn post_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserMutationResult>> {
    Ok(Json(create_user(&state.db, request).await?))
}

async fn patch_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserMutationResult>> {
    Ok(Json(
        update_user(&state.db, caller.identity(), &user_id, request).await?,
    ))
}

async fn remove_user(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> Result<Json<UserMutationResult>> {
    Ok(Json(delete_user(&state.db, caller.identity(), &user_id).await?))
}
