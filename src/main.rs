// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitClub API Server
//!
//! Links identity-provider sessions to member records and manages roles
//! for the FitClub mobile app.

use fitclub_api::{config::Config, db::FirestoreDb, middleware::auth::SessionDecoder, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        allow_seed_admin = config.allow_seed_admin,
        "Starting FitClub API"
    );

    let db = if config.in_memory_db {
        tracing::warn!("Using in-memory store; data is lost on restart");
        FirestoreDb::new_in_memory()
    } else {
        FirestoreDb::new(&config.gcp_project_id).await?
    };

    let session_decoder = SessionDecoder::from_config(&config)?;
    tracing::info!(
        issuer = config.identity_issuer.as_deref().unwrap_or("<any>"),
        "Session decoder initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        session_decoder,
    });

    // Build router
    let app = fitclub_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fitclub_api=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
