//! Collaborator traits defined in `warden-core` and implemented by adapters.

pub mod credential_store;
pub mod email;

pub use credential_store::CredentialStore;
pub use email::EmailSender;
