//! Named authorization policies over a caller's roles and claims.

pub mod defaults;
pub mod registry;
pub mod requirement;

pub use registry::{Policy, PolicyRegistry, PolicyRegistryBuilder};
pub use requirement::{Assertion, Requirement};
