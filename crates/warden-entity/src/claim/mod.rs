//! Typed key/value claims and the claim set policies evaluate against.

use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Well-known claim type names, matching the session token's JSON keys.
pub mod types {
    /// Principal identifier.
    pub const SUBJECT: &str = "sub";
    /// Email address.
    pub const EMAIL: &str = "email";
    /// Given name.
    pub const GIVEN_NAME: &str = "given_name";
    /// Surname.
    pub const SURNAME: &str = "family_name";
    /// Role membership. One claim per role.
    pub const ROLE: &str = "role";
}

/// A typed fact attached to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. [`types::EMAIL`].
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// The roles and claims of an authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Role names.
    pub roles: Vec<String>,
    /// Non-role claims.
    pub claims: Vec<Claim>,
}

impl ClaimSet {
    /// Creates a claim set.
    pub fn new(roles: Vec<String>, claims: Vec<Claim>) -> Self {
        Self { roles, claims }
    }

    /// Builds the claim set of a stored principal: identity claims, then
    /// the principal's own claims, plus its roles.
    pub fn from_principal(principal: &Principal) -> Self {
        let mut claims = vec![
            Claim::new(types::SUBJECT, principal.id.to_string()),
            Claim::new(types::GIVEN_NAME, principal.first_name.clone()),
            Claim::new(types::SURNAME, principal.last_name.clone()),
        ];
        if let Some(email) = &principal.email {
            claims.push(Claim::new(types::EMAIL, email.clone()));
        }
        claims.extend(principal.claims.iter().cloned());

        Self {
            roles: principal.roles.clone(),
            claims,
        }
    }

    /// Whether the caller holds `role`. Role names compare exactly.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether a claim of `claim_type` with exactly `value` is present.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }

    /// Iterates the values of every claim of `claim_type`.
    pub fn values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}
