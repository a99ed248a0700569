//! Remote-introspection verification (Facebook access tokens).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use warden_core::config::FacebookConfig;
use warden_core::error::AppError;
use warden_entity::ThirdPartyAssertion;

use super::{AssertionValidator, VerifiedIdentity};

/// Body returned by the introspection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntrospectionResponse {
    /// Token details; absent when the endpoint could not inspect the token.
    #[serde(default)]
    pub data: Option<IntrospectionData>,
}

/// Token details reported by the introspection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntrospectionData {
    /// Whether the token is currently valid.
    #[serde(default)]
    pub is_valid: bool,
    /// The user the token was issued to.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Accepts iff the response carried data, the token is valid, and it
/// belongs to `external_id`.
pub fn evaluate(response: Option<&IntrospectionResponse>, external_id: &str) -> bool {
    response
        .and_then(|r| r.data.as_ref())
        .is_some_and(|data| data.is_valid && data.user_id.as_deref() == Some(external_id))
}

/// Asks the issuing provider whether an opaque token is valid.
pub struct RemoteIntrospectionVerifier {
    client: reqwest::Client,
    url: String,
    app_id: String,
    app_secret: String,
}

impl fmt::Debug for RemoteIntrospectionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteIntrospectionVerifier")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl RemoteIntrospectionVerifier {
    /// Creates a verifier from Facebook configuration.
    pub fn new(config: &FacebookConfig) -> Result<Self, AppError> {
        if config.app_id.trim().is_empty() || config.app_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "third_party.facebook.app_id and app_secret must be set",
            ));
        }
        if config.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "third_party.facebook.timeout_seconds must be greater than zero",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.introspection_url.clone(),
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
        })
    }

    /// Calls the endpoint. Any transport, status, or parse failure yields `None`.
    async fn introspect(&self, token: &str) -> Option<IntrospectionResponse> {
        let access_token = format!("{}|{}", self.app_id, self.app_secret);
        let url = reqwest::Url::parse_with_params(
            &self.url,
            &[("input_token", token), ("access_token", access_token.as_str())],
        )
        .map_err(|e| warn!(error = %e, "Invalid introspection URL"))
        .ok()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| warn!(error = %e.without_url(), "Introspection request failed"))
            .ok()?;

        response
            .json::<IntrospectionResponse>()
            .await
            .map_err(|e| warn!(error = %e.without_url(), "Malformed introspection response"))
            .ok()
    }
}

#[async_trait]
impl AssertionValidator for RemoteIntrospectionVerifier {
    async fn validate(&self, assertion: &ThirdPartyAssertion) -> Result<VerifiedIdentity, AppError> {
        let response = self.introspect(&assertion.token).await;
        if !evaluate(response.as_ref(), &assertion.external_id) {
            warn!(provider = %assertion.provider, "Rejected introspected token");
            return Err(AppError::external_validation("Third-party token is not valid"));
        }

        Ok(VerifiedIdentity {
            provider: assertion.provider,
            external_id: assertion.external_id.clone(),
        })
    }
}
