//! Per-principal lockout bookkeeping.

pub mod state;

pub use state::LockoutState;
