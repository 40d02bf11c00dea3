//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Country code applied when a profile doesn't carry one.
pub const DEFAULT_COUNTRY_CODE: &str = "+57";

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Document ID (UUID v4)
    pub id: String,
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Email address, always stored lower-cased
    pub email: String,
    pub contact_emergency_name: String,
    pub contact_emergency_phone: String,
    /// Birth date as `YYYY-MM-DD`, or empty
    pub birthday: String,
    /// Phone number without country code
    pub phone: String,
    pub country_code: String,
    /// Identity provider subject, once the user has signed in
    #[serde(default)]
    pub clerk_id: Option<String>,
    /// Creation time (epoch ms)
    pub created_at: i64,
}

impl User {
    /// Full display name, trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.last_name).trim().to_string()
    }
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Identity-provider mirror stored in `auth_identities`.
///
/// Keyed by `provider_user_id`; at most one document per provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    pub user_id: String,
    /// Always `"clerk"`
    pub provider: String,
    pub provider_user_id: String,
    #[serde(default)]
    pub email_from_provider: Option<String>,
    /// Last bootstrap time (epoch ms)
    #[serde(default)]
    pub last_login_at: Option<i64>,
}

/// The only identity provider this backend mirrors.
pub const IDENTITY_PROVIDER: &str = "clerk";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
        assert_eq!(normalize_email(""), "");
    }
}
