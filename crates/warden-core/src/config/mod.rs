//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod authorization;
pub mod email;
pub mod logging;
pub mod seed;
pub mod third_party;

use serde::{Deserialize, Serialize};

pub use self::auth::{AuthConfig, LockoutConfig, PasswordConfig, TokenConfig};
pub use self::authorization::{AuthorizationConfig, PolicyDefinition};
pub use self::email::EmailConfig;
pub use self::logging::LoggingConfig;
pub use self::seed::SeedConfig;
pub use self::third_party::{FacebookConfig, GoogleConfig, ThirdPartyConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential, token, and lockout settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Third-party identity provider settings.
    #[serde(default)]
    pub third_party: ThirdPartyConfig,
    /// Confirmation and reset email settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// Declarative authorization policies.
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    /// Bootstrap data for an empty credential store.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `{path}` with an environment-specific overlay `config/{env}`
    /// and environment variables prefixed with `WARDEN_` (`__` separates
    /// nested keys, e.g. `WARDEN_AUTH__TOKEN__SECRET`).
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

pub(crate) fn default_true() -> bool {
    true
}
