//! # warden-core
//!
//! Core crate for Warden. Contains the unified error system, configuration
//! schemas, and the collaborator traits (credential storage, email delivery)
//! that the authentication engine is written against.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
