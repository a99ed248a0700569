//! Session token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use warden_core::config::TokenConfig;
use warden_core::error::AppError;

use super::claims::SessionClaims;

/// Verifies session tokens produced by [`super::TokenIssuer`].
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from token configuration.
    pub fn new(config: &TokenConfig) -> Result<Self, AppError> {
        if config.secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.token.secret must be set to a non-empty value",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 5; // seconds of clock skew
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        })
    }

    /// Verifies signature, issuer, and expiry and returns the claims.
    ///
    /// Every failure maps to the same invalid-token error.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Session token rejected");
                AppError::invalid_token()
            })
    }
}
