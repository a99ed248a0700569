//! Inputs accepted by the login orchestrator.

use std::fmt;

use serde::Deserialize;
use validator::Validate;

/// Local account registration.
#[derive(Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Given name.
    #[validate(length(min = 3, max = 15, message = "First name must be between 3 and 15 characters"))]
    pub first_name: String,
    /// Surname.
    #[validate(length(min = 3, max = 15, message = "Last name must be between 3 and 15 characters"))]
    pub last_name: String,
    /// Email address; also becomes the username.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password, checked against the password policy.
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A third-party login attempt as received from a client.
#[derive(Clone, Deserialize, Validate)]
pub struct ThirdPartyRequest {
    /// Provider name, e.g. `google`.
    #[validate(length(min = 1, message = "Provider is required"))]
    pub provider: String,
    /// Raw provider token.
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
    /// The provider's user ID the caller claims.
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
}

impl fmt::Debug for ThirdPartyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThirdPartyRequest")
            .field("provider", &self.provider)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Registration of an account backed by a third-party identity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ThirdPartyRegisterRequest {
    /// Given name.
    #[validate(length(min = 3, max = 15, message = "First name must be between 3 and 15 characters"))]
    pub first_name: String,
    /// Surname.
    #[validate(length(min = 3, max = 15, message = "Last name must be between 3 and 15 characters"))]
    pub last_name: String,
    /// Provider credentials.
    #[serde(flatten)]
    #[validate(nested)]
    pub assertion: ThirdPartyRequest,
}
