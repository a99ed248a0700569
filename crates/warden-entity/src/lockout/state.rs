//! Failed-attempt counter and lockout expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lockout state of one principal.
///
/// The counter resets to zero on successful verification or a forced
/// unlock. A principal is locked iff `lockout_end` is set and strictly
/// after the evaluation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutState {
    /// Consecutive failed attempts.
    pub failed_attempts: u32,
    /// End of the current lockout, if one was ever set.
    pub lockout_end: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Whether the lockout is active at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_end, Some(end) if end > now)
    }
}
