//! Member listing, locking, creation, editing, and deletion.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::traits::CredentialStore;
use warden_entity::{NewPrincipal, Principal, PrincipalId};

use crate::engine::validate_input;
use crate::lockout::LockoutPolicy;
use crate::password::{PasswordHasher, PasswordValidator};

/// A member as shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// Principal ID.
    pub id: PrincipalId,
    /// Username.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// When the member was created.
    pub created_at: DateTime<Utc>,
    /// Whether a lockout is active now.
    pub is_locked: bool,
    /// Assigned role names.
    pub roles: Vec<String>,
}

impl MemberView {
    fn from_principal(principal: Principal, now: DateTime<Utc>) -> Self {
        Self {
            id: principal.id,
            is_locked: principal.is_locked_at(now),
            username: principal.username,
            first_name: principal.first_name,
            last_name: principal.last_name,
            created_at: principal.created_at,
            roles: principal.roles,
        }
    }
}

/// Fields for creating or editing a member.
#[derive(Clone, Deserialize, Validate)]
pub struct MemberRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Given name.
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    /// Surname.
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    /// New password. Required on create; empty keeps the current one on edit.
    #[serde(default)]
    pub password: String,
    /// Comma-separated role names. Unknown names are ignored.
    #[serde(default)]
    pub roles: String,
}

impl fmt::Debug for MemberRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberRequest")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Administrative operations on members. The super-admin account cannot
/// be targeted.
#[derive(Clone)]
pub struct MemberAdmin {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    password_policy: PasswordValidator,
    lockout: LockoutPolicy,
}

impl fmt::Debug for MemberAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAdmin")
            .field("lockout", &self.lockout)
            .finish_non_exhaustive()
    }
}

impl MemberAdmin {
    /// Creates the admin service.
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            password_policy: PasswordValidator::new(&config.password),
            lockout: LockoutPolicy::new(&config.lockout),
        }
    }

    /// Lists every member except the super admin.
    pub async fn list_members(&self) -> Result<Vec<MemberView>, AppError> {
        let now = Utc::now();
        Ok(self
            .store
            .list_principals()
            .await?
            .into_iter()
            .filter(|p| !self.lockout.is_protected(p))
            .map(|p| MemberView::from_principal(p, now))
            .collect())
    }

    /// Returns one member. The super admin is reported as not found.
    pub async fn get_member(&self, id: PrincipalId) -> Result<MemberView, AppError> {
        let principal = self
            .store
            .find_by_id(id)
            .await?
            .filter(|p| !self.lockout.is_protected(p))
            .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
        Ok(MemberView::from_principal(principal, Utc::now()))
    }

    /// Locks a member for the configured lockout duration.
    pub async fn lock_member(&self, id: PrincipalId) -> Result<DateTime<Utc>, AppError> {
        let principal = self.guarded(id).await?;
        let until = Utc::now() + self.lockout.duration();
        self.store.set_lockout(principal.id, Some(until)).await?;
        info!(principal_id = %principal.id, locked_until = %until, "Member locked");
        Ok(until)
    }

    /// Clears a member's lockout and failed-attempt counter.
    pub async fn unlock_member(&self, id: PrincipalId) -> Result<(), AppError> {
        let principal = self.guarded(id).await?;
        self.store.set_lockout(principal.id, None).await?;
        self.store.reset_failed_attempts(principal.id).await?;
        info!(principal_id = %principal.id, "Member unlocked");
        Ok(())
    }

    /// Deletes a member.
    pub async fn delete_member(&self, id: PrincipalId) -> Result<(), AppError> {
        let principal = self.guarded(id).await?;
        self.store.delete(principal.id).await?;
        info!(principal_id = %principal.id, "Member deleted");
        Ok(())
    }

    /// Creates a pre-confirmed member with the given password and roles.
    pub async fn create_member(&self, request: &MemberRequest) -> Result<MemberView, AppError> {
        validate_input(request)?;
        let username = request.username.trim().to_lowercase();
        if self.is_protected_name(&username) {
            return Err(AppError::protected_account());
        }
        if self.store.find_by_name(&username).await?.is_some() {
            return Err(AppError::duplicate_account(format!(
                "Username '{username}' is already taken"
            )));
        }
        self.password_policy.validate(&request.password)?;

        let password_hash = self.hasher.hash_password(&request.password)?;
        let created = self
            .store
            .create(
                NewPrincipal {
                    username,
                    first_name: request.first_name.trim().to_lowercase(),
                    last_name: request.last_name.trim().to_lowercase(),
                    email: None,
                    email_confirmed: true,
                    provider: None,
                    external_id: None,
                },
                Some(password_hash),
            )
            .await?;

        let roles = self.known_roles(&request.roles).await?;
        if !roles.is_empty() {
            self.store.assign_roles(created.id, &roles).await?;
        }
        info!(principal_id = %created.id, roles = roles.len(), "Member created");
        self.get_member(created.id).await
    }

    /// Replaces a member's names, username, roles, and optionally password.
    pub async fn edit_member(
        &self,
        id: PrincipalId,
        request: &MemberRequest,
    ) -> Result<MemberView, AppError> {
        validate_input(request)?;
        let principal = self.guarded(id).await?;
        let username = request.username.trim().to_lowercase();
        if self.is_protected_name(&username) {
            return Err(AppError::protected_account());
        }

        if !request.password.is_empty() {
            self.password_policy.validate(&request.password)?;
        }
        self.store
            .update_profile(
                principal.id,
                &request.first_name.trim().to_lowercase(),
                &request.last_name.trim().to_lowercase(),
                &username,
            )
            .await?;
        if !request.password.is_empty() {
            let password_hash = self.hasher.hash_password(&request.password)?;
            self.store
                .set_password_hash(principal.id, &password_hash)
                .await?;
        }

        let roles = self.known_roles(&request.roles).await?;
        self.store.clear_roles(principal.id).await?;
        if !roles.is_empty() {
            self.store.assign_roles(principal.id, &roles).await?;
        }
        info!(principal_id = %principal.id, "Member edited");
        self.get_member(principal.id).await
    }

    /// Loads a member, rejecting the super admin.
    async fn guarded(&self, id: PrincipalId) -> Result<Principal, AppError> {
        let principal = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
        if let Err(e) = self.lockout.guard_modification(&principal) {
            warn!(principal_id = %principal.id, "Attempt to modify the super admin");
            return Err(e);
        }
        Ok(principal)
    }

    fn is_protected_name(&self, username: &str) -> bool {
        self.lockout.protected_username().eq_ignore_ascii_case(username)
    }

    /// Parses a comma list and keeps the stored spelling of known roles.
    async fn known_roles(&self, roles: &str) -> Result<Vec<String>, AppError> {
        let defined = self.store.role_names().await?;
        let mut selected: Vec<String> = Vec::new();
        for requested in roles.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            if let Some(role) = defined.iter().find(|d| d.eq_ignore_ascii_case(requested)) {
                if !selected.contains(role) {
                    selected.push(role.clone());
                }
            }
        }
        Ok(selected)
    }
}
