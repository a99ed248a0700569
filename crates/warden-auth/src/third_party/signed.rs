//! Signed-assertion verification (Google ID tokens).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::Deserialize;
use tracing::warn;

use warden_core::config::GoogleConfig;
use warden_core::error::AppError;
use warden_entity::ThirdPartyAssertion;

use super::keys::{JwksKeySource, KeySource};
use super::{AssertionValidator, VerifiedIdentity};

/// Audience claim: a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience.
    One(String),
    /// Several audiences.
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, client_id: &str) -> bool {
        match self {
            Self::One(aud) => aud == client_id,
            Self::Many(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

/// The claims of an assertion that take part in verification.
#[derive(Debug, Clone, Deserialize)]
pub struct AssertionClaims {
    /// Audience.
    #[serde(default)]
    pub aud: Option<Audience>,
    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,
    /// Expiry (seconds since epoch).
    #[serde(default)]
    pub exp: Option<i64>,
    /// Subject: the provider's user ID.
    #[serde(default)]
    pub sub: Option<String>,
}

/// Verifies RS256-signed assertions against the issuer's published keys.
#[derive(Debug, Clone)]
pub struct SignedAssertionVerifier {
    client_id: String,
    allowed_issuers: Vec<String>,
    keys: Arc<dyn KeySource>,
}

impl SignedAssertionVerifier {
    /// Creates a verifier using `keys` for signature checks.
    pub fn new(config: &GoogleConfig, keys: Arc<dyn KeySource>) -> Result<Self, AppError> {
        if config.client_id.trim().is_empty() {
            return Err(AppError::configuration(
                "third_party.google.client_id must be set",
            ));
        }
        if config.allowed_issuers.is_empty() {
            return Err(AppError::configuration(
                "third_party.google.allowed_issuers must not be empty",
            ));
        }
        Ok(Self {
            client_id: config.client_id.clone(),
            allowed_issuers: config.allowed_issuers.clone(),
            keys,
        })
    }

    /// Creates a verifier that fetches the configured JWK set.
    pub fn from_config(config: &GoogleConfig) -> Result<Self, AppError> {
        let keys = JwksKeySource::from_config(config)?;
        Self::new(config, Arc::new(keys))
    }

    /// Verifies `assertion` as of `now`.
    pub async fn verify_at(
        &self,
        assertion: &ThirdPartyAssertion,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, AppError> {
        let claims = self.verify_signature(&assertion.token).await?;
        self.check_claims(&claims, &assertion.external_id, now)
            .map_err(|reason| {
                warn!(provider = %assertion.provider, reason, "Rejected signed assertion");
                AppError::external_validation("Third-party token is not valid")
            })?;

        Ok(VerifiedIdentity {
            provider: assertion.provider,
            external_id: assertion.external_id.clone(),
        })
    }

    /// Checks the signature only; every claim check happens in
    /// [`Self::check_claims`] so no check depends on library defaults.
    async fn verify_signature(&self, token: &str) -> Result<AssertionClaims, AppError> {
        let rejected = || AppError::external_validation("Third-party token is not valid");

        let header = decode_header(token).map_err(|e| {
            warn!(error = %e, "Malformed signed assertion header");
            rejected()
        })?;
        if header.alg != Algorithm::RS256 {
            warn!(alg = ?header.alg, "Unsupported assertion algorithm");
            return Err(rejected());
        }

        let key = self.keys.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        decode::<AssertionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "Signed assertion failed signature check");
                rejected()
            })
    }

    /// Audience, issuer, expiry, and subject checks. Returns the first
    /// failing check.
    pub fn check_claims(
        &self,
        claims: &AssertionClaims,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), &'static str> {
        if !claims
            .aud
            .as_ref()
            .is_some_and(|aud| aud.contains(&self.client_id))
        {
            return Err("audience mismatch");
        }
        if !claims
            .iss
            .as_ref()
            .is_some_and(|iss| self.allowed_issuers.iter().any(|allowed| allowed == iss))
        {
            return Err("issuer not allowed");
        }
        match claims.exp {
            Some(exp) if exp > now.timestamp() => {}
            _ => return Err("expired"),
        }
        if claims.sub.as_deref() != Some(external_id) {
            return Err("subject mismatch");
        }
        Ok(())
    }
}

#[async_trait]
impl AssertionValidator for SignedAssertionVerifier {
    async fn validate(&self, assertion: &ThirdPartyAssertion) -> Result<VerifiedIdentity, AppError> {
        self.verify_at(assertion, Utc::now()).await
    }
}
