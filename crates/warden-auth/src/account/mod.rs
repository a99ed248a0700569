//! Email confirmation and password recovery plumbing.

pub mod codec;
pub mod mail;

pub use mail::{MailComposer, OutgoingMail};
