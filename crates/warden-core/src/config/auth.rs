//! Authentication configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token signing and lifetime.
    #[serde(default)]
    pub token: TokenConfig,
    /// Failed-attempt lockout policy.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Password policy for new passwords.
    #[serde(default)]
    pub password: PasswordConfig,
    /// Role assigned to self-registered accounts.
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            lockout: LockoutConfig::default(),
            password: PasswordConfig::default(),
            default_role: default_role(),
        }
    }
}

/// Session token configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for token signing (HMAC-SHA256). Must be non-empty.
    #[serde(default)]
    pub secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Token validity window in days.
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
    /// Static claims embedded in every issued token.
    #[serde(default)]
    pub custom_claims: BTreeMap<String, String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_issuer(),
            validity_days: default_validity_days(),
            custom_claims: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("validity_days", &self.validity_days)
            .field("custom_claims", &self.custom_claims)
            .finish()
    }
}

/// Lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed attempts that trigger a lockout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Lockout duration in minutes.
    #[serde(default = "default_lockout_minutes")]
    pub duration_minutes: u64,
    /// Username of the reserved super-admin account.
    #[serde(default = "default_super_admin")]
    pub super_admin_username: String,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            duration_minutes: default_lockout_minutes(),
            super_admin_username: default_super_admin(),
        }
    }
}

/// Password policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Minimum password length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Whether to require a zxcvbn score of at least three.
    #[serde(default)]
    pub require_strong: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_strong: false,
        }
    }
}

fn default_role() -> String {
    "player".to_string()
}

fn default_issuer() -> String {
    "warden".to_string()
}

fn default_validity_days() -> u32 {
    7
}

fn default_max_attempts() -> u32 {
    3
}

fn default_lockout_minutes() -> u64 {
    24 * 60
}

fn default_super_admin() -> String {
    "admin@gmail.com".to_string()
}

fn default_min_length() -> usize {
    6
}
