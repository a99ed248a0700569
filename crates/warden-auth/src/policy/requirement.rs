//! A single predicate inside a policy.

use std::fmt;
use std::sync::Arc;

use warden_entity::ClaimSet;

/// Boolean function over a caller's claim set.
pub type Assertion = Arc<dyn Fn(&ClaimSet) -> bool + Send + Sync>;

/// One predicate of a policy.
#[derive(Clone)]
pub enum Requirement {
    /// Satisfied when the caller holds any of the listed roles.
    RoleAny(Vec<String>),
    /// Satisfied when a claim of `claim_type` equals `value` exactly.
    ClaimEquals {
        /// Claim type to look for.
        claim_type: String,
        /// Required value.
        value: String,
    },
    /// Satisfied when the assertion returns true.
    Composite(Assertion),
}

impl Requirement {
    /// Requires any one of `roles`.
    pub fn role_any<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RoleAny(roles.into_iter().map(Into::into).collect())
    }

    /// Requires an exact claim match.
    pub fn claim_equals(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ClaimEquals {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Requires an arbitrary predicate.
    pub fn composite<F>(assertion: F) -> Self
    where
        F: Fn(&ClaimSet) -> bool + Send + Sync + 'static,
    {
        Self::Composite(Arc::new(assertion))
    }

    /// Evaluates this requirement against `claims`.
    pub fn is_satisfied(&self, claims: &ClaimSet) -> bool {
        match self {
            Self::RoleAny(roles) => roles.iter().any(|role| claims.has_role(role)),
            Self::ClaimEquals { claim_type, value } => claims.has_claim(claim_type, value),
            Self::Composite(assertion) => assertion(claims),
        }
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleAny(roles) => f.debug_tuple("RoleAny").field(roles).finish(),
            Self::ClaimEquals { claim_type, value } => f
                .debug_struct("ClaimEquals")
                .field("claim_type", claim_type)
                .field("value", value)
                .finish(),
            Self::Composite(_) => f.write_str("Composite(..)"),
        }
    }
}
