//! Well-known role names.

/// Full administrator.
pub const ADMIN: &str = "admin";
/// Manager.
pub const MANAGER: &str = "manager";
/// Default role of self-registered accounts.
pub const PLAYER: &str = "player";
