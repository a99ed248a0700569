//! Validation of identity tokens issued by third-party providers.

pub mod introspection;
pub mod keys;
pub mod signed;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use warden_core::config::ThirdPartyConfig;
use warden_core::error::AppError;
use warden_entity::{ExternalProvider, ThirdPartyAssertion};

pub use introspection::RemoteIntrospectionVerifier;
pub use keys::{JwksKeySource, KeySource, StaticKeySource};
pub use signed::SignedAssertionVerifier;

/// The identity a provider vouched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider that vouched.
    pub provider: ExternalProvider,
    /// Verified external subject identifier.
    pub external_id: String,
}

/// Verifies one provider's assertions.
///
/// Implementations reject with [`warden_core::error::ErrorKind::ExternalValidationFailure`];
/// transport and parse failures are rejections too.
#[async_trait]
pub trait AssertionValidator: Send + Sync + fmt::Debug + 'static {
    /// Verifies `assertion` and returns the vouched identity.
    async fn validate(&self, assertion: &ThirdPartyAssertion) -> Result<VerifiedIdentity, AppError>;
}

/// Dispatches assertions to the validator of their provider.
#[derive(Debug, Clone, Default)]
pub struct ThirdPartyValidators {
    validators: HashMap<ExternalProvider, Arc<dyn AssertionValidator>>,
}

impl ThirdPartyValidators {
    /// Creates an empty dispatcher; every assertion is rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the validator for `provider`.
    pub fn with_validator(
        mut self,
        provider: ExternalProvider,
        validator: Arc<dyn AssertionValidator>,
    ) -> Self {
        self.validators.insert(provider, validator);
        self
    }

    /// Builds validators for every provider that has credentials configured.
    pub fn from_config(config: &ThirdPartyConfig) -> Result<Self, AppError> {
        let mut validators = Self::new();

        if !config.google.client_id.trim().is_empty() {
            validators = validators.with_validator(
                ExternalProvider::Google,
                Arc::new(SignedAssertionVerifier::from_config(&config.google)?),
            );
        }
        if !config.facebook.app_id.trim().is_empty() {
            validators = validators.with_validator(
                ExternalProvider::Facebook,
                Arc::new(RemoteIntrospectionVerifier::new(&config.facebook)?),
            );
        }

        info!(
            providers = ?validators.providers(),
            "Third-party validators configured"
        );
        Ok(validators)
    }

    /// Providers with a validator installed.
    pub fn providers(&self) -> Vec<ExternalProvider> {
        let mut providers: Vec<_> = self.validators.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    /// Validates `assertion` with its provider's validator.
    pub async fn validate(
        &self,
        assertion: &ThirdPartyAssertion,
    ) -> Result<VerifiedIdentity, AppError> {
        let Some(validator) = self.validators.get(&assertion.provider) else {
            warn!(provider = %assertion.provider, "No validator configured for provider");
            return Err(AppError::external_validation(format!(
                "Provider '{}' is not configured",
                assertion.provider
            )));
        };

        let identity = validator.validate(assertion).await?;
        if identity.provider != assertion.provider || identity.external_id != assertion.external_id
        {
            return Err(AppError::external_validation("Third-party token is not valid"));
        }
        Ok(identity)
    }
}
