//! Lockout decisions over a principal's failed-attempt counter and expiry.

use chrono::{DateTime, Duration, Utc};

use warden_core::config::LockoutConfig;
use warden_core::error::AppError;
use warden_entity::{LockoutState, Principal};

/// Decides when principals are locked and protects the super-admin account.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lockout.
    max_attempts: u32,
    /// How long a lockout lasts.
    duration: Duration,
    /// Username of the reserved super-admin account.
    super_admin_username: String,
}

impl LockoutPolicy {
    /// Creates a policy from lockout configuration.
    pub fn new(config: &LockoutConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            duration: Duration::minutes(config.duration_minutes as i64),
            super_admin_username: config.super_admin_username.clone(),
        }
    }

    /// Returns the configured lockout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True iff a lockout expiry is set and strictly after `now`.
    pub fn check_locked(&self, state: &LockoutState, now: DateTime<Utc>) -> bool {
        state.is_locked_at(now)
    }

    /// Computes the state after one verification attempt.
    ///
    /// Success resets the counter and clears the expiry. Failure increments
    /// the counter (unless `exempt`) and, once it reaches the maximum, sets
    /// the expiry to `now + duration` without resetting the counter.
    pub fn record_attempt(
        &self,
        state: &LockoutState,
        succeeded: bool,
        now: DateTime<Utc>,
        exempt: bool,
    ) -> LockoutState {
        if succeeded {
            return LockoutState::default();
        }
        if exempt {
            return *state;
        }

        let failed_attempts = state.failed_attempts.saturating_add(1);
        LockoutState {
            failed_attempts,
            lockout_end: self
                .lockout_after(failed_attempts, now)
                .or(state.lockout_end),
        }
    }

    /// Lockout expiry to apply once the counter has reached `failed_attempts`.
    pub fn lockout_after(&self, failed_attempts: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (failed_attempts >= self.max_attempts).then(|| now + self.duration)
    }

    /// Username of the reserved super-admin account.
    pub fn protected_username(&self) -> &str {
        &self.super_admin_username
    }

    /// Whether `principal` is the reserved super-admin account.
    pub fn is_protected(&self, principal: &Principal) -> bool {
        principal
            .username
            .eq_ignore_ascii_case(&self.super_admin_username)
    }

    /// Rejects administrative modification of the super-admin account.
    pub fn guard_modification(&self, principal: &Principal) -> Result<(), AppError> {
        if self.is_protected(principal) {
            return Err(AppError::protected_account());
        }
        Ok(())
    }
}
