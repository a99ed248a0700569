//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PrincipalId;
use crate::claim::Claim;
use crate::lockout::LockoutState;
use crate::provider::ExternalProvider;

/// A verified user identity as held by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier.
    pub id: PrincipalId,
    /// Login name. Lower-cased email for local accounts,
    /// `provider:subject` for federated ones. Editable by administrators.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Email address (absent for most federated accounts).
    pub email: Option<String>,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Federating provider; `None` for local-password accounts.
    pub provider: Option<ExternalProvider>,
    /// Subject identifier at the federating provider. Never edited.
    pub external_id: Option<String>,
    /// Argon2 PHC hash; `None` for federated accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Assigned role names, in storage order.
    pub roles: Vec<String>,
    /// Additional claims assigned to the principal.
    pub claims: Vec<Claim>,
    /// Failed-attempt counter and lockout expiry.
    pub lockout: LockoutState,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Whether this account authenticates through a third-party provider.
    pub fn is_federated(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether this principal is the account for `external_id` at `provider`.
    pub fn is_linked_to(&self, provider: ExternalProvider, external_id: &str) -> bool {
        self.provider == Some(provider) && self.external_id.as_deref() == Some(external_id)
    }

    /// Whether the account is locked at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout.is_locked_at(now)
    }

    /// Whether the principal holds the given role (case-insensitive).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Data required to create a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrincipal {
    /// Desired username.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Whether the email starts out confirmed.
    pub email_confirmed: bool,
    /// Federating provider, if any.
    pub provider: Option<ExternalProvider>,
    /// Subject identifier at the provider.
    pub external_id: Option<String>,
}
