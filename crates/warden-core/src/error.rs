//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The [`ErrorKind`] taxonomy is what
//! callers branch on; messages are safe to show to end users and never say
//! more than the kind implies.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error kind categorization used across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Bad username or password.
    InvalidCredential,
    /// The account is under an active lockout.
    Locked,
    /// Attempt to lock, unlock, edit, or delete the reserved super-admin account.
    ProtectedAccountModification,
    /// The account exists but its email address has not been confirmed.
    UnconfirmedEmail,
    /// Registration collided with an existing account.
    DuplicateAccount,
    /// Malformed, expired, or already-used confirmation or reset token.
    InvalidToken,
    /// A third-party identity assertion was rejected.
    ExternalValidationFailure,
    /// Missing or inconsistent configuration. Fatal at startup.
    Configuration,
    /// Input validation failed.
    Validation,
    /// The requested record was not found.
    NotFound,
    /// The credential store reported a fault.
    Storage,
    /// An outbound email could not be delivered.
    Delivery,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Coarse category used by transport layers to pick a response class.
    ///
    /// `InvalidCredential` and `Locked` share a category so the immediate
    /// response class never reveals which of the two occurred.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidCredential | Self::Locked | Self::UnconfirmedEmail => "AUTHENTICATION",
            Self::ExternalValidationFailure => "AUTHENTICATION",
            Self::ProtectedAccountModification => "AUTHORIZATION",
            Self::DuplicateAccount | Self::InvalidToken | Self::Validation => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Configuration => "CONFIGURATION",
            Self::Storage | Self::Delivery | Self::Serialization | Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredential => write!(f, "INVALID_CREDENTIAL"),
            Self::Locked => write!(f, "LOCKED"),
            Self::ProtectedAccountModification => write!(f, "PROTECTED_ACCOUNT"),
            Self::UnconfirmedEmail => write!(f, "UNCONFIRMED_EMAIL"),
            Self::DuplicateAccount => write!(f, "DUPLICATE_ACCOUNT"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::ExternalValidationFailure => write!(f, "EXTERNAL_VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Delivery => write!(f, "DELIVERY"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Warden.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// End of the active lockout, set only for [`ErrorKind::Locked`].
    pub locked_until: Option<DateTime<Utc>>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            locked_until: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            locked_until: None,
            source: Some(Box::new(source)),
        }
    }

    /// The generic rejection for a failed local login.
    pub fn invalid_credential() -> Self {
        Self::new(ErrorKind::InvalidCredential, "Invalid username or password")
    }

    /// Create a lockout error carrying the unlock time.
    pub fn locked(until: DateTime<Utc>) -> Self {
        Self {
            kind: ErrorKind::Locked,
            message: format!(
                "Your account has been locked. You should wait until {} (UTC) to be able to login",
                until.format("%Y-%m-%d %H:%M:%S")
            ),
            locked_until: Some(until),
            source: None,
        }
    }

    /// Create a protected-account error.
    pub fn protected_account() -> Self {
        Self::new(
            ErrorKind::ProtectedAccountModification,
            "The super admin account cannot be modified",
        )
    }

    /// Create an unconfirmed-email error.
    pub fn unconfirmed_email() -> Self {
        Self::new(ErrorKind::UnconfirmedEmail, "Please confirm your email address")
    }

    /// Create a duplicate-account error.
    pub fn duplicate_account(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAccount, message)
    }

    /// The generic rejection for confirmation and reset tokens.
    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken, "Invalid or expired token")
    }

    /// Create an external-validation error.
    pub fn external_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalValidationFailure, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delivery, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error must abort startup rather than fail one request.
    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            locked_until: self.locked_until,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
