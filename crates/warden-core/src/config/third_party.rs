//! Third-party identity provider configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Settings for every supported external identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThirdPartyConfig {
    /// Signed-assertion provider (Google ID tokens).
    #[serde(default)]
    pub google: GoogleConfig,
    /// Remote-introspection provider (Facebook access tokens).
    #[serde(default)]
    pub facebook: FacebookConfig,
}

/// Google ID-token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client ID; must equal the assertion's `aud` claim.
    #[serde(default)]
    pub client_id: String,
    /// Exact `iss` values accepted.
    #[serde(default = "default_google_issuers")]
    pub allowed_issuers: Vec<String>,
    /// Endpoint publishing the provider's signing keys as a JWK set.
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// How long a fetched key set is reused before refetching.
    #[serde(default = "default_jwks_cache")]
    pub jwks_cache_seconds: u64,
    /// Minimum gap between refetches triggered by unknown key IDs.
    #[serde(default = "default_jwks_min_refetch")]
    pub jwks_min_refetch_seconds: u64,
    /// Timeout for the key set fetch.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            allowed_issuers: default_google_issuers(),
            jwks_url: default_jwks_url(),
            jwks_cache_seconds: default_jwks_cache(),
            jwks_min_refetch_seconds: default_jwks_min_refetch(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Facebook token introspection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    /// Application ID.
    #[serde(default)]
    pub app_id: String,
    /// Application secret, sent only to the introspection endpoint.
    #[serde(default)]
    pub app_secret: String,
    /// Introspection endpoint URL.
    #[serde(default = "default_introspection_url")]
    pub introspection_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            introspection_url: default_introspection_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl fmt::Debug for FacebookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("introspection_url", &self.introspection_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn default_google_issuers() -> Vec<String> {
    vec![
        "accounts.google.com".to_string(),
        "https://accounts.google.com".to_string(),
    ]
}

fn default_jwks_url() -> String {
    "https://www.googleapis.com/oauth2/v3/certs".to_string()
}

fn default_jwks_cache() -> u64 {
    3600
}

fn default_jwks_min_refetch() -> u64 {
    60
}

fn default_introspection_url() -> String {
    "https://graph.facebook.com/debug_token".to_string()
}

fn default_timeout() -> u64 {
    10
}
