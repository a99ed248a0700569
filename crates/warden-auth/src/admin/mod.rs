//! Administrative member management.

pub mod members;

pub use members::{MemberAdmin, MemberRequest, MemberView};
