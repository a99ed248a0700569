//! Claims payload embedded in every session token.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_entity::claim::types;
use warden_entity::{Claim, ClaimSet, PrincipalId};

/// Names the issuer owns; configured custom claims may not reuse them.
pub const RESERVED_CLAIMS: &[&str] = &[
    types::SUBJECT,
    types::EMAIL,
    types::GIVEN_NAME,
    types::SURNAME,
    types::ROLE,
    "iss",
    "iat",
    "exp",
    "aud",
    "nbf",
];

/// JWT claims payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject, the principal ID.
    pub sub: PrincipalId,
    /// The principal's username.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub given_name: String,
    /// Surname.
    #[serde(default)]
    pub family_name: String,
    /// One entry per assigned role, in storage order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Static custom claims from configuration.
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

impl SessionClaims {
    /// Returns the principal ID from the subject claim.
    pub fn principal_id(&self) -> PrincipalId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Checks whether this token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

impl From<&SessionClaims> for ClaimSet {
    fn from(claims: &SessionClaims) -> Self {
        let mut set = vec![
            Claim::new(types::SUBJECT, claims.sub.to_string()),
            Claim::new(types::EMAIL, claims.email.clone()),
            Claim::new(types::GIVEN_NAME, claims.given_name.clone()),
            Claim::new(types::SURNAME, claims.family_name.clone()),
        ];
        set.extend(
            claims
                .custom
                .iter()
                .map(|(name, value)| Claim::new(name.clone(), value.clone())),
        );
        ClaimSet::new(claims.role.clone(), set)
    }
}

/// A signed session token and the claims it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Compact JWS serialization.
    pub token: String,
    /// Claims embedded in the token.
    pub claims: SessionClaims,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}
