// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// The first eight variants are the stable auth taxonomy; `code()` returns
/// the kind clients match on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User creation failed: {message}")]
    UserCreationFailed {
        message: String,
        #[source]
        cause: Option<Box<AppError>>,
    },

    #[error("User lookup failed: {0}")]
    UserLookupFailed(String),

    #[error("User profile lookup failed: {message}")]
    UserProfileLookupFailed {
        message: String,
        #[source]
        cause: Option<Box<AppError>>,
    },

    #[error("User profile not found in database")]
    UserProfileNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap a failure as `USER_CREATION_FAILED`, keeping it as the cause.
    ///
    /// Errors that already carry that kind pass through unchanged.
    pub fn creation_failed(context: &str, err: AppError) -> Self {
        match err {
            AppError::UserCreationFailed { .. } => err,
            other => AppError::UserCreationFailed {
                message: format!("{}: {}", context, other),
                cause: Some(Box::new(other)),
            },
        }
    }

    /// Wrap a store failure during profile resolution.
    pub fn profile_lookup_failed(err: AppError) -> Self {
        AppError::UserProfileLookupFailed {
            message: format!("Failed to get user profile: {}", err),
            cause: Some(Box::new(err)),
        }
    }

    /// Stable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::UserCreationFailed { .. } => "USER_CREATION_FAILED",
            AppError::UserLookupFailed(_) => "USER_LOOKUP_FAILED",
            AppError::UserProfileLookupFailed { .. } => "USER_PROFILE_LOOKUP_FAILED",
            AppError::UserProfileNotFound => "USER_PROFILE_NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::Unauthorized | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, Some(msg.clone())),
            AppError::UserLookupFailed(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::UserProfileNotFound => (StatusCode::NOT_FOUND, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::UserCreationFailed { message, .. } => {
                tracing::error!(error = %message, "User creation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::UserProfileLookupFailed { message, .. } => {
                tracing::error!(error = %message, "User profile lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::TokenGenerationFailed => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
