// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity-provider session middleware.
//!
//! The provider issues and signs session tokens; this only decodes them into
//! an [`Identity`]. Requests without a token continue anonymously.

use crate::config::{Config, IdentityKey};
use crate::services::identity::Identity;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

/// Cookie the identity provider sets for same-site web sessions.
pub const SESSION_COOKIE: &str = "__session";

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (provider user ID)
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            subject: claims.sub,
            email: claims.email,
            given_name: claims.given_name,
            family_name: claims.family_name,
            picture_url: claims.picture,
        }
    }
}

/// Decodes provider session tokens with the configured key.
#[derive(Clone)]
pub struct SessionDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl SessionDecoder {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (key, algorithm) = match &config.identity_key {
            IdentityKey::RsaPem(pem) => {
                (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256)
            }
            IdentityKey::Secret(secret) => (DecodingKey::from_secret(secret), Algorithm::HS256),
        };

        let mut validation = Validation::new(algorithm);
        // Provider session tokens carry no audience
        validation.validate_aud = false;
        if let Some(issuer) = &config.identity_issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    pub fn decode(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.into())
    }
}

/// Middleware that attaches the caller's identity when a session token is present.
///
/// A present but invalid token is rejected with 401.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => Some(h[7..].to_string()),
            Some(_) => return Err(StatusCode::UNAUTHORIZED),
            None => None,
        }
    };

    if let Some(token) = token {
        let identity = state.session_decoder.decode(&token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            StatusCode::UNAUTHORIZED
        })?;
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

/// Extractor for the (possibly anonymous) caller.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<Identity>().cloned()))
    }
}
