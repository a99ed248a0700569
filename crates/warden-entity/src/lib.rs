//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate is either a
//! record owned by the credential store (principals and their lockout
//! state) or a transient value object (claims, third-party assertions).
//! This crate has no internal dependencies.

pub mod claim;
pub mod lockout;
pub mod principal;
pub mod provider;
pub mod role;

pub use claim::{Claim, ClaimSet};
pub use lockout::LockoutState;
pub use principal::{NewPrincipal, Principal, PrincipalId};
pub use provider::{ExternalProvider, ParseProviderError, ThirdPartyAssertion, ValidationMethod};
