//! In-process credential store and email outbox.

pub mod outbox;
pub mod store;
pub mod tokens;

pub use outbox::{MemoryOutbox, SentMail};
pub use store::MemoryCredentialStore;
pub use tokens::TokenPurpose;
