//! Credential store trait: lookup and mutation of principal records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_entity::{Claim, ExternalProvider, NewPrincipal, Principal, PrincipalId};

use crate::result::AppResult;

/// Persistent storage of principals, roles, lockout counters, and
/// single-use account tokens.
///
/// Implementations must make every method atomic with respect to the
/// principal it touches; in particular `increment_failed_attempts` is a
/// read-modify-write that must not lose updates under concurrent calls.
/// Passwords cross this boundary only as Argon2 PHC hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a principal by identifier.
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>>;

    /// Find a principal by username (case-insensitive).
    async fn find_by_name(&self, username: &str) -> AppResult<Option<Principal>>;

    /// Find a principal by email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>>;

    /// Find a federated principal by provider and external subject.
    async fn find_by_external_id(
        &self,
        provider: ExternalProvider,
        external_id: &str,
    ) -> AppResult<Option<Principal>>;

    /// List every principal.
    async fn list_principals(&self) -> AppResult<Vec<Principal>>;

    /// Create a principal with an optional password hash.
    ///
    /// Fails with `DuplicateAccount` when the username is taken.
    async fn create(
        &self,
        principal: NewPrincipal,
        password_hash: Option<String>,
    ) -> AppResult<Principal>;

    /// Replace the principal's names and username.
    async fn update_profile(
        &self,
        id: PrincipalId,
        first_name: &str,
        last_name: &str,
        username: &str,
    ) -> AppResult<()>;

    /// Replace the principal's password hash.
    async fn set_password_hash(&self, id: PrincipalId, password_hash: &str) -> AppResult<()>;

    /// Delete a principal. Returns `true` if it existed.
    async fn delete(&self, id: PrincipalId) -> AppResult<bool>;

    /// Set or clear the lockout expiry.
    async fn set_lockout(&self, id: PrincipalId, until: Option<DateTime<Utc>>) -> AppResult<()>;

    /// Increment the failed-attempt counter and return the new value.
    async fn increment_failed_attempts(&self, id: PrincipalId) -> AppResult<u32>;

    /// Reset the failed-attempt counter to zero.
    async fn reset_failed_attempts(&self, id: PrincipalId) -> AppResult<()>;

    /// Add roles to the principal. Unknown role names are rejected.
    async fn assign_roles(&self, id: PrincipalId, roles: &[String]) -> AppResult<()>;

    /// Remove every role from the principal.
    async fn clear_roles(&self, id: PrincipalId) -> AppResult<()>;

    /// Add claims to the principal.
    async fn add_claims(&self, id: PrincipalId, claims: &[Claim]) -> AppResult<()>;

    /// Names of all defined roles.
    async fn role_names(&self) -> AppResult<Vec<String>>;

    /// Define a role. Defining an existing role is a no-op.
    async fn create_role(&self, name: &str) -> AppResult<()>;

    /// Issue a single-use, time-bounded email confirmation token.
    async fn generate_email_confirmation_token(&self, id: PrincipalId) -> AppResult<String>;

    /// Issue a single-use, time-bounded password reset token.
    async fn generate_password_reset_token(&self, id: PrincipalId) -> AppResult<String>;

    /// Consume a confirmation token and mark the email confirmed.
    ///
    /// Fails with `InvalidToken` if the token is unknown, expired, already
    /// used, or issued for another principal.
    async fn confirm_email(&self, id: PrincipalId, token: &str) -> AppResult<()>;

    /// Consume a reset token and replace the password hash.
    ///
    /// Fails with `InvalidToken` under the same conditions as `confirm_email`.
    async fn reset_password(
        &self,
        id: PrincipalId,
        token: &str,
        new_password_hash: &str,
    ) -> AppResult<()>;
}
