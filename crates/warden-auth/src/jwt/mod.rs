//! Session token encoding, decoding, and claims management.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{SessionClaims, SessionToken};
pub use decoder::TokenVerifier;
pub use encoder::TokenIssuer;
