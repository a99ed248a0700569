//! Confirmation and recovery emails, rendered from embedded Tera templates.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use tera::{Context, Tera};

use warden_core::config::EmailConfig;
use warden_core::error::AppError;
use warden_entity::Principal;

const CONFIRM_TEMPLATE: &str = "confirm_email.html";
const RESET_TEMPLATE: &str = "reset_password.html";

// `.html` names turn on Tera's autoescaping for every substituted value.
const TPL_CONFIRM: &str = include_str!("templates/confirm_email.html");
const TPL_RESET: &str = include_str!("templates/reset_password.html");

/// A composed message ready for an [`warden_core::traits::EmailSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Builds links and bodies for account emails.
#[derive(Clone)]
pub struct MailComposer {
    config: EmailConfig,
    templates: Arc<Tera>,
}

impl fmt::Debug for MailComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailComposer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MailComposer {
    /// Creates a composer from email configuration.
    pub fn new(config: &EmailConfig) -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_template(CONFIRM_TEMPLATE, TPL_CONFIRM)
            .and_then(|()| tera.add_raw_template(RESET_TEMPLATE, TPL_RESET))
            .map_err(|e| AppError::configuration(format!("Invalid email template: {e}")))?;

        let composer = Self {
            config: config.clone(),
            templates: Arc::new(tera),
        };
        // Both links must be buildable before the first mail goes out.
        composer.link(&config.confirm_email_path, "token", "user@example.com")?;
        composer.link(&config.reset_password_path, "token", "user@example.com")?;
        Ok(composer)
    }

    /// `{client_url}/{path}?token=..&email=..`
    fn link(&self, path: &str, token: &str, email: &str) -> Result<Url, AppError> {
        let base = format!(
            "{}/{}",
            self.config.client_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse_with_params(&base, &[("token", token), ("email", email)])
            .map_err(|e| AppError::configuration(format!("Invalid email link base '{base}': {e}")))
    }

    fn render(&self, template: &str, principal: &Principal, link: &Url) -> Result<String, AppError> {
        let mut context = Context::new();
        context.insert("first_name", &principal.first_name);
        context.insert("last_name", &principal.last_name);
        context.insert("username", &principal.username);
        context.insert("link", link.as_str());
        context.insert("application_name", &self.config.application_name);

        self.templates
            .render(template, &context)
            .map_err(|e| AppError::internal(format!("Failed to render {template}: {e}")))
    }

    /// Email confirmation message carrying an encoded token.
    pub fn confirmation(
        &self,
        principal: &Principal,
        to: &str,
        encoded_token: &str,
    ) -> Result<OutgoingMail, AppError> {
        let url = self.link(&self.config.confirm_email_path, encoded_token, to)?;
        Ok(OutgoingMail {
            to: to.to_string(),
            subject: "Confirm your email".to_string(),
            html_body: self.render(CONFIRM_TEMPLATE, principal, &url)?,
        })
    }

    /// Password reset message; also reminds the principal of their username.
    pub fn password_reset(
        &self,
        principal: &Principal,
        to: &str,
        encoded_token: &str,
    ) -> Result<OutgoingMail, AppError> {
        let url = self.link(&self.config.reset_password_path, encoded_token, to)?;
        Ok(OutgoingMail {
            to: to.to_string(),
            subject: "Forgot your username or password".to_string(),
            html_body: self.render(RESET_TEMPLATE, principal, &url)?,
        })
    }
}
