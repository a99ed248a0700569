//! # warden-auth
//!
//! The authentication and authorization engine for Warden.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and policy enforcement
//! - `lockout` — Failed-attempt lockout decisions and super-admin protection
//! - `jwt` — Session token issuance and verification
//! - `third_party` — Signed-assertion and remote-introspection validators
//! - `policy` — Named role, claim, and composite authorization policies
//! - `engine` — Login, registration, refresh, and recovery flows
//! - `admin` — Administrative member management
//! - `account` — Confirmation and reset links and emails
//! - `seed` — Bootstrap data for an empty store

pub mod account;
pub mod admin;
pub mod engine;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod policy;
pub mod seed;
pub mod third_party;

pub use admin::{MemberAdmin, MemberRequest, MemberView};
pub use engine::{
    AuthEngine, LoginResult, RegisterRequest, ThirdPartyRegisterRequest, ThirdPartyRequest,
};
pub use jwt::{SessionClaims, SessionToken, TokenIssuer, TokenVerifier};
pub use lockout::LockoutPolicy;
pub use password::{PasswordHasher, PasswordValidator};
pub use policy::{PolicyRegistry, Requirement};
pub use seed::{SeedReport, seed_defaults};
pub use third_party::{
    AssertionValidator, RemoteIntrospectionVerifier, SignedAssertionVerifier, ThirdPartyValidators,
    VerifiedIdentity,
};
