//! Principal domain entities.

pub mod id;
pub mod model;

pub use id::PrincipalId;
pub use model::{NewPrincipal, Principal};
