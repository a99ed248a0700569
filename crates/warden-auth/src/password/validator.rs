//! Password policy enforcement for new passwords.

use warden_core::config::PasswordConfig;
use warden_core::error::AppError;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Whether to require a zxcvbn score of at least three.
    require_strong: bool,
}

impl PasswordValidator {
    /// Creates a new validator from password configuration.
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            require_strong: config.require_strong,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or a validation error describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        if self.require_strong {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if estimate.score() < zxcvbn::Score::Three {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }
}
