//! Email sender that keeps messages in memory instead of delivering them.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use warden_core::result::AppResult;
use warden_core::traits::EmailSender;

/// A message captured by [`MemoryOutbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Recipient.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Records every message. When declining, messages are still recorded but
/// `send` reports `false`.
#[derive(Debug)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<SentMail>>,
    accepting: AtomicBool,
}

impl MemoryOutbox {
    /// Creates an outbox that accepts every message.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accepting: AtomicBool::new(true),
        }
    }

    /// Makes subsequent sends succeed or be declined.
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// All messages recorded so far.
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    /// The most recent message sent to `to`.
    pub async fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|mail| mail.to.eq_ignore_ascii_case(to))
            .cloned()
    }
}

impl Default for MemoryOutbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for MemoryOutbox {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<bool> {
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        let accepted = self.accepting.load(Ordering::SeqCst);
        debug!(subject, accepted, "Captured outbound email");
        Ok(accepted)
    }
}
