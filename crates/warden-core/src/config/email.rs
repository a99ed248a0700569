//! Confirmation and reset email configuration.

use serde::{Deserialize, Serialize};

/// Settings used to build links and bodies of outbound account emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Base URL of the client application hosting the confirm/reset pages.
    #[serde(default = "default_client_url")]
    pub client_url: String,
    /// Path of the email confirmation page.
    #[serde(default = "default_confirm_path")]
    pub confirm_email_path: String,
    /// Path of the password reset page.
    #[serde(default = "default_reset_path")]
    pub reset_password_path: String,
    /// Name used to sign outbound emails.
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            client_url: default_client_url(),
            confirm_email_path: default_confirm_path(),
            reset_password_path: default_reset_path(),
            application_name: default_application_name(),
        }
    }
}

fn default_client_url() -> String {
    "http://localhost:4200".to_string()
}

fn default_confirm_path() -> String {
    "account/confirm-email".to_string()
}

fn default_reset_path() -> String {
    "account/reset-password".to_string()
}

fn default_application_name() -> String {
    "Warden".to_string()
}
