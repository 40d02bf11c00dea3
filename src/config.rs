//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The identity provider's verification key is the
//! only secret this service needs.

use std::env;

/// Key used to decode the identity provider's session tokens.
#[derive(Debug, Clone)]
pub enum IdentityKey {
    /// RS256 public key in PEM form (production provider keys)
    RsaPem(String),
    /// HS256 shared secret (local development and tests)
    Secret(Vec<u8>),
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Use the in-memory store instead of Firestore
    pub in_memory_db: bool,

    /// Identity provider session token key
    pub identity_key: IdentityKey,
    /// Expected `iss` claim, if set
    pub identity_issuer: Option<String>,

    /// Whether the one-time admin seed is permitted
    pub allow_seed_admin: bool,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            in_memory_db: true,
            identity_key: IdentityKey::Secret(b"test_identity_key_32_bytes_min!!".to_vec()),
            identity_issuer: None,
            allow_seed_admin: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let identity_key = match (
            env::var("IDENTITY_JWT_PUBLIC_KEY"),
            env::var("IDENTITY_JWT_SECRET"),
        ) {
            (Ok(pem), _) => IdentityKey::RsaPem(pem.replace("\\n", "\n")),
            (Err(_), Ok(secret)) => IdentityKey::Secret(secret.trim().as_bytes().to_vec()),
            _ => return Err(ConfigError::Missing("IDENTITY_JWT_PUBLIC_KEY")),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            in_memory_db: env::var("USE_IN_MEMORY_DB")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            identity_key,
            identity_issuer: env::var("IDENTITY_ISSUER")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            allow_seed_admin: parse_allow_seed_admin(env::var("ALLOW_SEED_ADMIN").ok().as_deref()),
        })
    }
}

/// Seeding stays enabled unless the flag is explicitly `"false"`.
pub fn parse_allow_seed_admin(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("IDENTITY_JWT_SECRET", "test_identity_secret");
        env::set_var("ALLOW_SEED_ADMIN", "false");

        let config = Config::from_env().expect("Config should load");

        assert!(!config.allow_seed_admin);
        assert_eq!(config.port, 8080);
        match config.identity_key {
            IdentityKey::Secret(key) => assert_eq!(key, b"test_identity_secret"),
            IdentityKey::RsaPem(_) => {
                // IDENTITY_JWT_PUBLIC_KEY set in the outer environment takes precedence
            }
        }
    }

    #[test]
    fn test_allow_seed_admin_defaults_true() {
        assert!(parse_allow_seed_admin(None));
        assert!(parse_allow_seed_admin(Some("true")));
        assert!(parse_allow_seed_admin(Some("1")));
        assert!(!parse_allow_seed_admin(Some("false")));
        assert!(!parse_allow_seed_admin(Some(" FALSE ")));
    }
}
