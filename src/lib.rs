// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitClub API: membership identity and role management
//!
//! This crate provides the backend for the FitClub mobile app. It links
//! identity-provider sessions to local member records, assigns and enforces
//! roles (client, trainer, admin), and keeps an audit trail of those changes.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use middleware::auth::SessionDecoder;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub session_decoder: SessionDecoder,
}
