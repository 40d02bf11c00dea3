// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod audit;
pub mod bootstrap;
pub mod identity;
pub mod rbac;
pub mod roles;
pub mod users;

pub use bootstrap::{bootstrap_on_first_login, BootstrapResult};
pub use identity::{whoami, Identity, WhoAmI};
pub use rbac::{enforce_any_role, enforce_role, get_active_role};
pub use roles::{has_admin, list_users_with_roles, seed_admin_by_email, set_role};
