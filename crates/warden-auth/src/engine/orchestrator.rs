//! The authentication engine: login, third-party login, registration,
//! token refresh, authorization, and account recovery flows.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use warden_core::config::AppConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::traits::{CredentialStore, EmailSender};
use warden_entity::{
    ClaimSet, ExternalProvider, NewPrincipal, Principal, PrincipalId, ThirdPartyAssertion,
};

use crate::account::codec;
use crate::account::{MailComposer, OutgoingMail};
use crate::jwt::{SessionClaims, SessionToken, TokenIssuer, TokenVerifier};
use crate::lockout::LockoutPolicy;
use crate::password::{PasswordHasher, PasswordValidator};
use crate::policy::PolicyRegistry;
use crate::third_party::{ThirdPartyValidators, VerifiedIdentity};

use super::requests::{RegisterRequest, ThirdPartyRequest, ThirdPartyRegisterRequest};
use super::validate_input;

/// Result of a successful authentication.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// The authenticated principal.
    pub principal: Principal,
    /// Signed session token.
    pub session: SessionToken,
}

/// Composes credential verification, lockout, third-party validation,
/// token issuance, and policy evaluation.
///
/// Holds no mutable state of its own; lockout counters live in the
/// credential store.
#[derive(Clone)]
pub struct AuthEngine {
    /// Principal storage.
    store: Arc<dyn CredentialStore>,
    /// Outbound email.
    mailer: Arc<dyn EmailSender>,
    /// Argon2 hasher.
    hasher: PasswordHasher,
    /// New-password policy.
    password_policy: PasswordValidator,
    /// Lockout decisions.
    lockout: LockoutPolicy,
    /// Session token signing.
    issuer: TokenIssuer,
    /// Session token verification.
    verifier: TokenVerifier,
    /// Third-party assertion validation.
    validators: ThirdPartyValidators,
    /// Named authorization policies.
    policies: Arc<PolicyRegistry>,
    /// Account email composition.
    composer: MailComposer,
    /// Role assigned to self-registered principals.
    default_role: String,
}

impl std::fmt::Debug for AuthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEngine")
            .field("lockout", &self.lockout)
            .field("issuer", &self.issuer)
            .field("validators", &self.validators)
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

impl AuthEngine {
    /// Creates an engine with explicitly supplied validators and policies.
    ///
    /// Fails with a configuration error when the signing secret or email
    /// link settings are unusable.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn EmailSender>,
        validators: ThirdPartyValidators,
        policies: Arc<PolicyRegistry>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store,
            mailer,
            hasher: PasswordHasher::new(),
            password_policy: PasswordValidator::new(&config.auth.password),
            lockout: LockoutPolicy::new(&config.auth.lockout),
            issuer: TokenIssuer::new(&config.auth.token)?,
            verifier: TokenVerifier::new(&config.auth.token)?,
            validators,
            policies,
            composer: MailComposer::new(&config.email)?,
            default_role: config.auth.default_role.clone(),
        })
    }

    /// Creates an engine whose validators and policies come from configuration.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Result<Self, AppError> {
        let validators = ThirdPartyValidators::from_config(&config.third_party)?;
        let policies = Arc::new(PolicyRegistry::from_config(&config.authorization)?);
        Self::new(config, store, mailer, validators, policies)
    }

    /// Returns the policy registry.
    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    /// Local username/password login.
    ///
    /// 1. Reject unknown and federated principals after a dummy hash check
    /// 2. Reject if the principal is locked (before any password work)
    /// 3. Verify the password
    /// 4. On failure, count the attempt and lock once the limit is reached
    /// 5. On success, clear the counter and any stale lockout
    /// 6. Require a confirmed email
    /// 7. Issue a session token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let found = self.store.find_by_name(username.trim()).await?;
        let mut principal = match found {
            Some(p) if !p.is_federated() && p.password_hash.is_some() => p,
            _ => {
                self.hasher.verify_dummy(password);
                return Err(AppError::invalid_credential());
            }
        };

        let now = Utc::now();
        if self.lockout.check_locked(&principal.lockout, now) {
            warn!(principal_id = %principal.id, "Login attempt on locked account");
            return Err(match principal.lockout.lockout_end {
                Some(until) => AppError::locked(until),
                None => AppError::invalid_credential(),
            });
        }

        let verified = principal
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.hasher.verify_password(password, hash));

        if !verified {
            self.record_failure(&principal).await?;
            return Err(AppError::invalid_credential());
        }

        let exempt = self.lockout.is_protected(&principal);
        let cleared = self
            .lockout
            .record_attempt(&principal.lockout, true, now, exempt);
        if principal.lockout.failed_attempts != cleared.failed_attempts {
            self.store.reset_failed_attempts(principal.id).await?;
        }
        if principal.lockout.lockout_end.is_some() {
            self.store.set_lockout(principal.id, None).await?;
        }
        principal.lockout = cleared;

        if !principal.email_confirmed {
            return Err(AppError::unconfirmed_email());
        }

        let session = self.issuer.issue(&principal)?;
        info!(principal_id = %principal.id, "Login successful");
        Ok(LoginResult { principal, session })
    }

    /// Counts a failed password attempt and applies a lockout once the
    /// limit is reached. The super admin is never counted.
    async fn record_failure(&self, principal: &Principal) -> Result<(), AppError> {
        if self.lockout.is_protected(principal) {
            warn!(principal_id = %principal.id, "Failed login on protected account");
            return Ok(());
        }

        let attempts = self.store.increment_failed_attempts(principal.id).await?;
        if let Some(until) = self.lockout.lockout_after(attempts, Utc::now()) {
            self.store.set_lockout(principal.id, Some(until)).await?;
            warn!(
                principal_id = %principal.id,
                attempts,
                locked_until = %until,
                "Account locked after repeated failed logins"
            );
        } else {
            info!(principal_id = %principal.id, attempts, "Failed login attempt");
        }
        Ok(())
    }

    /// Login with a third-party identity. Never creates an account and
    /// bypasses local lockout tracking.
    pub async fn login_third_party(
        &self,
        request: &ThirdPartyRequest,
    ) -> Result<LoginResult, AppError> {
        let identity = self.verify_third_party(request).await?;

        let principal = self
            .store
            .find_by_external_id(identity.provider, &identity.external_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorKind::InvalidCredential, "Unable to find your account")
            })?;

        let session = self.issuer.issue(&principal)?;
        info!(
            principal_id = %principal.id,
            provider = %identity.provider,
            "Third-party login successful"
        );
        Ok(LoginResult { principal, session })
    }

    /// Registers a local account and sends the confirmation email.
    ///
    /// The account stays unusable for login until confirmed. When the email
    /// cannot be delivered the account is kept and a delivery error is
    /// returned; the caller may request a resend.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Principal, AppError> {
        validate_input(request)?;
        self.password_policy.validate(&request.password)?;

        let email = request.email.trim().to_lowercase();
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::duplicate_account(format!(
                "An account using {email} already exists. Please try another email address"
            )));
        }

        let password_hash = self.hasher.hash_password(&request.password)?;
        let created = self
            .store
            .create(
                NewPrincipal {
                    username: email.clone(),
                    first_name: request.first_name.trim().to_lowercase(),
                    last_name: request.last_name.trim().to_lowercase(),
                    email: Some(email),
                    email_confirmed: false,
                    provider: None,
                    external_id: None,
                },
                Some(password_hash),
            )
            .await?;
        self.store
            .assign_roles(created.id, std::slice::from_ref(&self.default_role))
            .await?;
        info!(principal_id = %created.id, "Account registered");

        let principal = self.reload(created).await?;
        self.send_confirmation(&principal).await?;
        Ok(principal)
    }

    /// Registers an account backed by a verified third-party identity and
    /// signs it in. Federated accounts start confirmed.
    pub async fn register_third_party(
        &self,
        request: &ThirdPartyRegisterRequest,
    ) -> Result<LoginResult, AppError> {
        validate_input(request)?;
        let identity = self.verify_third_party(&request.assertion).await?;

        let existing = self
            .store
            .find_by_external_id(identity.provider, &identity.external_id)
            .await?;
        if existing.is_some() {
            return Err(AppError::duplicate_account(format!(
                "You have an account already. Please login with your {}",
                identity.provider
            )));
        }

        let created = self
            .store
            .create(
                NewPrincipal {
                    username: format!("{}:{}", identity.provider, identity.external_id),
                    first_name: request.first_name.trim().to_lowercase(),
                    last_name: request.last_name.trim().to_lowercase(),
                    email: None,
                    email_confirmed: true,
                    provider: Some(identity.provider),
                    external_id: Some(identity.external_id.clone()),
                },
                None,
            )
            .await?;
        self.store
            .assign_roles(created.id, std::slice::from_ref(&self.default_role))
            .await?;

        let principal = self.reload(created).await?;
        let session = self.issuer.issue(&principal)?;
        info!(
            principal_id = %principal.id,
            provider = %identity.provider,
            "Third-party account registered"
        );
        Ok(LoginResult { principal, session })
    }

    /// Issues a fresh token for an already-authenticated principal.
    pub async fn refresh(&self, principal_id: PrincipalId) -> Result<LoginResult, AppError> {
        let principal = self
            .store
            .find_by_id(principal_id)
            .await?
            .ok_or_else(AppError::invalid_credential)?;

        if self.lockout.check_locked(&principal.lockout, Utc::now()) {
            if let Some(until) = principal.lockout.lockout_end {
                return Err(AppError::locked(until));
            }
        }

        let session = self.issuer.issue(&principal)?;
        Ok(LoginResult { principal, session })
    }

    /// Refreshes using the claims of a bearer token.
    pub async fn refresh_token(&self, token: &str) -> Result<LoginResult, AppError> {
        let claims = self.verify_token(token)?;
        self.refresh(claims.principal_id()).await
    }

    /// Verifies a session token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.verifier.verify(token)
    }

    /// Evaluates a named policy against a caller's claims.
    pub fn authorize(&self, claims: &ClaimSet, policy: &str) -> Result<bool, AppError> {
        self.policies.authorize(claims, policy)
    }

    /// Evaluates `policy` against a stored principal's roles and claims.
    ///
    /// Unlike [`authorize_token`](Self::authorize_token) this sees claims
    /// assigned in the store, such as the seeded email and surname claims.
    pub async fn authorize_principal(
        &self,
        principal_id: PrincipalId,
        policy: &str,
    ) -> Result<bool, AppError> {
        let principal = self
            .store
            .find_by_id(principal_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Principal {principal_id} not found")))?;
        self.policies
            .authorize(&ClaimSet::from_principal(&principal), policy)
    }

    /// Verifies a bearer token, then evaluates `policy` against its claims.
    pub fn authorize_token(&self, token: &str, policy: &str) -> Result<bool, AppError> {
        let claims = self.verifier.verify(token)?;
        self.policies.authorize(&ClaimSet::from(&claims), policy)
    }

    /// Confirms an email address with a link token.
    ///
    /// Unknown or already-confirmed addresses fail exactly like a bad token.
    pub async fn confirm_email(&self, email: &str, token: &str) -> Result<(), AppError> {
        let principal = self
            .store
            .find_by_email(email.trim())
            .await?
            .filter(|p| !p.email_confirmed)
            .ok_or_else(AppError::invalid_token)?;

        let raw = codec::decode_token(token).ok_or_else(AppError::invalid_token)?;
        self.store
            .confirm_email(principal.id, &raw)
            .await
            .map_err(opaque_token_error)?;

        info!(principal_id = %principal.id, "Email confirmed");
        Ok(())
    }

    /// Sends a new confirmation link to an unconfirmed address.
    pub async fn resend_confirmation_email(&self, email: &str) -> Result<(), AppError> {
        let principal = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("This email address has not been registered yet"))?;
        if principal.email_confirmed {
            return Err(AppError::validation(
                "Your email address was confirmed before. Please login to your account",
            ));
        }
        self.send_confirmation(&principal).await
    }

    /// Emails the principal their username and a password reset link.
    pub async fn forgot_username_or_password(&self, email: &str) -> Result<(), AppError> {
        let principal = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("This email address has not been registered yet"))?;
        if !principal.email_confirmed {
            return Err(AppError::unconfirmed_email());
        }

        let raw = self.store.generate_password_reset_token(principal.id).await?;
        let to = recipient(&principal)?;
        let mail = self
            .composer
            .password_reset(&principal, to, &codec::encode_token(&raw))?;
        self.deliver(&principal, mail).await
    }

    /// Replaces the password using a reset link token.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let principal = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or_else(AppError::invalid_token)?;
        if !principal.email_confirmed {
            return Err(AppError::unconfirmed_email());
        }

        self.password_policy.validate(new_password)?;
        let raw = codec::decode_token(token).ok_or_else(AppError::invalid_token)?;
        let password_hash = self.hasher.hash_password(new_password)?;

        self.store
            .reset_password(principal.id, &raw, &password_hash)
            .await
            .map_err(opaque_token_error)?;

        info!(principal_id = %principal.id, "Password reset");
        Ok(())
    }

    async fn verify_third_party(
        &self,
        request: &ThirdPartyRequest,
    ) -> Result<VerifiedIdentity, AppError> {
        validate_input(request)?;
        let provider: ExternalProvider = request
            .provider
            .parse()
            .map_err(|e| AppError::validation(format!("{e}")))?;
        let assertion =
            ThirdPartyAssertion::new(provider, request.access_token.clone(), request.user_id.clone());
        self.validators.validate(&assertion).await
    }

    async fn send_confirmation(&self, principal: &Principal) -> Result<(), AppError> {
        let raw = self
            .store
            .generate_email_confirmation_token(principal.id)
            .await?;
        let to = recipient(principal)?;
        let mail = self
            .composer
            .confirmation(principal, to, &codec::encode_token(&raw))?;
        self.deliver(principal, mail).await
    }

    async fn deliver(&self, principal: &Principal, mail: OutgoingMail) -> Result<(), AppError> {
        match self
            .mailer
            .send(&mail.to, &mail.subject, &mail.html_body)
            .await
        {
            Ok(true) => {
                info!(principal_id = %principal.id, subject = %mail.subject, "Account email sent");
                Ok(())
            }
            Ok(false) => {
                error!(principal_id = %principal.id, "Email transport declined message");
                Err(AppError::delivery(
                    "Failed to send email. Please contact admin",
                ))
            }
            Err(e) => {
                error!(principal_id = %principal.id, error = %e, "Email delivery failed");
                Err(AppError::delivery(
                    "Failed to send email. Please contact admin",
                ))
            }
        }
    }

    async fn reload(&self, principal: Principal) -> Result<Principal, AppError> {
        Ok(self
            .store
            .find_by_id(principal.id)
            .await?
            .unwrap_or(principal))
    }
}

fn recipient(principal: &Principal) -> Result<&str, AppError> {
    principal
        .email
        .as_deref()
        .ok_or_else(|| AppError::validation("The account has no email address"))
}

/// Store faults pass through; anything else becomes the generic token error.
fn opaque_token_error(err: AppError) -> AppError {
    match err.kind {
        ErrorKind::Storage => err,
        _ => AppError::invalid_token(),
    }
}
