//! Session token creation with configurable signing secret, issuer, and TTL.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tracing::debug;

use warden_core::config::TokenConfig;
use warden_core::error::AppError;
use warden_entity::Principal;

use super::claims::{RESERVED_CLAIMS, SessionClaims, SessionToken};

/// Creates HS256-signed session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written to every token.
    issuer: String,
    /// Token lifetime.
    validity: Duration,
    /// Static claims appended to every token.
    custom_claims: BTreeMap<String, String>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("validity", &self.validity)
            .field("custom_claims", &self.custom_claims)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates a new issuer from token configuration.
    ///
    /// Fails with a configuration error when the secret is empty or a custom
    /// claim reuses a reserved claim name.
    pub fn new(config: &TokenConfig) -> Result<Self, AppError> {
        if config.secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.token.secret must be set to a non-empty value",
            ));
        }
        if config.validity_days == 0 {
            return Err(AppError::configuration(
                "auth.token.validity_days must be positive",
            ));
        }
        if let Some(name) = config
            .custom_claims
            .keys()
            .find(|name| RESERVED_CLAIMS.contains(&name.as_str()))
        {
            return Err(AppError::configuration(format!(
                "Custom claim '{name}' collides with a reserved claim"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            validity: Duration::days(i64::from(config.validity_days)),
            custom_claims: config.custom_claims.clone(),
        })
    }

    /// Issues a session token for `principal` at the current time.
    pub fn issue(&self, principal: &Principal) -> Result<SessionToken, AppError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issues a session token for `principal` as of `now`.
    pub fn issue_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, AppError> {
        let expires_at = now + self.validity;
        let claims = SessionClaims {
            sub: principal.id,
            email: principal.username.clone(),
            given_name: principal.first_name.clone(),
            family_name: principal.last_name.clone(),
            role: principal.roles.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            custom: self.custom_claims.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))?;

        debug!(principal_id = %principal.id, roles = claims.role.len(), "Issued session token");

        Ok(SessionToken {
            token,
            claims,
            expires_at,
        })
    }

    /// Returns the configured issuer string.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}
