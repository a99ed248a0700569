//! In-memory credential store using a Tokio mutex.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::CredentialStore;
use warden_entity::{Claim, ExternalProvider, LockoutState, NewPrincipal, Principal, PrincipalId};

use super::tokens::{TokenPurpose, TokenRecord, generate_token};

/// Default lifetime of confirmation and reset tokens.
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Internal state for the memory-based store.
#[derive(Debug, Default)]
struct InnerState {
    /// Principals by identifier.
    principals: HashMap<PrincipalId, Principal>,
    /// Defined roles, in creation order.
    roles: Vec<String>,
    /// Outstanding account tokens.
    tokens: HashMap<String, TokenRecord>,
}

impl InnerState {
    fn principal_mut(&mut self, id: PrincipalId) -> AppResult<&mut Principal> {
        self.principals
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Principal {id} not found")))
    }

    fn username_taken(&self, username: &str, except: Option<PrincipalId>) -> bool {
        self.principals
            .values()
            .any(|p| Some(p.id) != except && p.username.eq_ignore_ascii_case(username))
    }

    /// Removes and returns the record if it authorizes the redemption.
    /// Unredeemable tokens stay in place so a wrong principal cannot burn them.
    fn take_token(
        &mut self,
        token: &str,
        principal: PrincipalId,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> AppResult<TokenRecord> {
        let redeemable = self
            .tokens
            .get(token)
            .is_some_and(|record| record.redeemable(principal, purpose, now));
        if !redeemable {
            return Err(AppError::invalid_token());
        }
        self.tokens
            .remove(token)
            .ok_or_else(AppError::invalid_token)
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.tokens.retain(|_, record| record.expires_at > now);
    }
}

/// In-memory credential store.
///
/// Suitable for single-process deployments and tests only.
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
    /// Lifetime of confirmation and reset tokens.
    token_lifetime: Duration,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InnerState::default())),
            token_lifetime: Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        }
    }

    /// Overrides the lifetime of confirmation and reset tokens.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    async fn issue_token(&self, id: PrincipalId, purpose: TokenPurpose) -> AppResult<String> {
        let mut state = self.state.lock().await;
        if !state.principals.contains_key(&id) {
            return Err(AppError::not_found(format!("Principal {id} not found")));
        }

        let now = Utc::now();
        state.purge_expired(now);

        let token = generate_token();
        state.tokens.insert(
            token.clone(),
            TokenRecord {
                principal: id,
                purpose,
                expires_at: now + self.token_lifetime,
            },
        );
        debug!(principal_id = %id, purpose = ?purpose, "Account token issued");
        Ok(token)
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state.principals.get(&id).cloned())
    }

    async fn find_by_name(&self, username: &str) -> AppResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .values()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .values()
            .find(|p| {
                p.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        provider: ExternalProvider,
        external_id: &str,
    ) -> AppResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .values()
            .find(|p| p.is_linked_to(provider, external_id))
            .cloned())
    }

    async fn list_principals(&self) -> AppResult<Vec<Principal>> {
        let state = self.state.lock().await;
        let mut principals: Vec<Principal> = state.principals.values().cloned().collect();
        principals.sort_by_key(|p| p.created_at);
        Ok(principals)
    }

    async fn create(
        &self,
        principal: NewPrincipal,
        password_hash: Option<String>,
    ) -> AppResult<Principal> {
        let mut state = self.state.lock().await;

        if state.username_taken(&principal.username, None) {
            return Err(AppError::duplicate_account(format!(
                "Username '{}' is already taken",
                principal.username
            )));
        }

        let created = Principal {
            id: PrincipalId::new(),
            username: principal.username,
            first_name: principal.first_name,
            last_name: principal.last_name,
            email: principal.email,
            email_confirmed: principal.email_confirmed,
            provider: principal.provider,
            external_id: principal.external_id,
            password_hash,
            roles: Vec::new(),
            claims: Vec::new(),
            lockout: LockoutState::default(),
            created_at: Utc::now(),
        };

        state.principals.insert(created.id, created.clone());
        info!(principal_id = %created.id, "Principal created");
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: PrincipalId,
        first_name: &str,
        last_name: &str,
        username: &str,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.username_taken(username, Some(id)) {
            return Err(AppError::duplicate_account(format!(
                "Username '{username}' is already taken"
            )));
        }

        let principal = state.principal_mut(id)?;
        principal.first_name = first_name.to_string();
        principal.last_name = last_name.to_string();
        principal.username = username.to_string();
        Ok(())
    }

    async fn set_password_hash(&self, id: PrincipalId, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.principal_mut(id)?.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn delete(&self, id: PrincipalId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.principals.remove(&id).is_some();
        if removed {
            state.tokens.retain(|_, record| record.principal != id);
        }
        Ok(removed)
    }

    async fn set_lockout(&self, id: PrincipalId, until: Option<DateTime<Utc>>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.principal_mut(id)?.lockout.lockout_end = until;
        Ok(())
    }

    async fn increment_failed_attempts(&self, id: PrincipalId) -> AppResult<u32> {
        let mut state = self.state.lock().await;
        let lockout = &mut state.principal_mut(id)?.lockout;
        lockout.failed_attempts = lockout.failed_attempts.saturating_add(1);
        Ok(lockout.failed_attempts)
    }

    async fn reset_failed_attempts(&self, id: PrincipalId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.principal_mut(id)?.lockout.failed_attempts = 0;
        Ok(())
    }

    async fn assign_roles(&self, id: PrincipalId, roles: &[String]) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let mut resolved = Vec::with_capacity(roles.len());
        for role in roles {
            let defined = state
                .roles
                .iter()
                .find(|r| r.eq_ignore_ascii_case(role))
                .cloned()
                .ok_or_else(|| AppError::validation(format!("Unknown role '{role}'")))?;
            resolved.push(defined);
        }

        let principal = state.principal_mut(id)?;
        for role in resolved {
            if !principal.roles.contains(&role) {
                principal.roles.push(role);
            }
        }
        Ok(())
    }

    async fn clear_roles(&self, id: PrincipalId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.principal_mut(id)?.roles.clear();
        Ok(())
    }

    async fn add_claims(&self, id: PrincipalId, claims: &[Claim]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.principal_mut(id)?.claims.extend_from_slice(claims);
        Ok(())
    }

    async fn role_names(&self) -> AppResult<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state.roles.clone())
    }

    async fn create_role(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.roles.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            state.roles.push(name.to_string());
        }
        Ok(())
    }

    async fn generate_email_confirmation_token(&self, id: PrincipalId) -> AppResult<String> {
        self.issue_token(id, TokenPurpose::EmailConfirmation).await
    }

    async fn generate_password_reset_token(&self, id: PrincipalId) -> AppResult<String> {
        self.issue_token(id, TokenPurpose::PasswordReset).await
    }

    async fn confirm_email(&self, id: PrincipalId, token: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.take_token(token, id, TokenPurpose::EmailConfirmation, Utc::now())?;
        state.principal_mut(id)?.email_confirmed = true;
        Ok(())
    }

    async fn reset_password(
        &self,
        id: PrincipalId,
        token: &str,
        new_password_hash: &str,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.take_token(token, id, TokenPurpose::PasswordReset, Utc::now())?;
        state.principal_mut(id)?.password_hash = Some(new_password_hash.to_string());
        state
            .tokens
            .retain(|_, r| !(r.principal == id && r.purpose == TokenPurpose::PasswordReset));
        Ok(())
    }
}
