//! # warden-store
//!
//! Credential store adapters for Warden. The in-memory store keeps every
//! principal, role, and outstanding account token behind a single async
//! mutex, which makes each trait call atomic. The outbox captures account
//! emails in place of a mail transport. Both back the CLI and the test
//! suites; production deployments plug a database-backed
//! [`CredentialStore`](warden_core::traits::CredentialStore) in its place.

pub mod memory;

pub use memory::{MemoryCredentialStore, MemoryOutbox, SentMail};
