//! External identity providers and their assertions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalProvider {
    /// Google: signed ID-token assertions.
    Google,
    /// Facebook: opaque access tokens checked by remote introspection.
    Facebook,
}

/// How a provider's assertions are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMethod {
    /// Verify a signature against the issuer's published keys.
    SignedAssertion,
    /// Ask the issuer whether the token is valid.
    RemoteIntrospection,
}

impl ExternalProvider {
    /// Return the provider as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Return how this provider's assertions are verified.
    pub fn validation_method(&self) -> ValidationMethod {
        match self {
            Self::Google => ValidationMethod::SignedAssertion,
            Self::Facebook => ValidationMethod::RemoteIntrospection,
        }
    }
}

impl fmt::Display for ExternalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a provider name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid provider: '{0}'. Expected one of: google, facebook")]
pub struct ParseProviderError(pub String);

impl FromStr for ExternalProvider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

/// A third-party identity token presented at login or registration.
/// Transient; never persisted.
#[derive(Clone, Serialize, Deserialize)]
pub struct ThirdPartyAssertion {
    /// Issuing provider.
    pub provider: ExternalProvider,
    /// Opaque raw token.
    pub token: String,
    /// External subject identifier the caller claims to be.
    pub external_id: String,
}

impl ThirdPartyAssertion {
    /// Creates an assertion.
    pub fn new(
        provider: ExternalProvider,
        token: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            token: token.into(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Debug for ThirdPartyAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThirdPartyAssertion")
            .field("provider", &self.provider)
            .field("external_id", &self.external_id)
            .finish_non_exhaustive()
    }
}
