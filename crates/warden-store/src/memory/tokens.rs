//! Single-use account tokens (email confirmation, password reset).

use chrono::{DateTime, Utc};
use rand::RngCore;

use warden_entity::PrincipalId;

/// What an account token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    /// Confirms the principal's email address.
    EmailConfirmation,
    /// Replaces the principal's password.
    PasswordReset,
}

/// An outstanding token.
#[derive(Debug, Clone)]
pub(crate) struct TokenRecord {
    pub principal: PrincipalId,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Whether this record authorizes `purpose` for `principal` at `now`.
    pub fn redeemable(&self, principal: PrincipalId, purpose: TokenPurpose, now: DateTime<Utc>) -> bool {
        self.principal == principal && self.purpose == purpose && self.expires_at > now
    }
}

/// Generates a 256-bit random token, hex encoded.
pub(crate) fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
