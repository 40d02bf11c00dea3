// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod audit;
pub mod role;
pub mod summary;
pub mod user;

pub use audit::{AuthEvent, AuthEventType};
pub use role::{Role, RoleAssignment};
pub use summary::{calculate_age, map_user_to_summary, UserSummary};
pub use user::{AuthIdentity, User};
