//! Outbound email delivery trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Delivers HTML emails.
#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug + 'static {
    /// Send one message. `Ok(false)` means the transport declined it.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<bool>;
}
