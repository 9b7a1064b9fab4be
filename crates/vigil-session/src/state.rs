//! Derived session state.

use std::fmt;
use std::time::Duration;

/// Why a session is (or just became) invalid.
///
/// The snake_case form from [`as_str`](Self::as_str) is what lands in logs
/// and in the post-logout redirect query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// No record exists (never signed in, storage cleared, or record
    /// unreadable).
    NoSession,
    /// The inactivity budget ran out.
    IdleTimeout,
    /// The maximum session lifetime ran out.
    AbsoluteTimeout,
    /// The user (or the auth provider) ended the session explicitly.
    ManualLogout,
}

impl ExpiryReason {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::IdleTimeout => "idle_timeout",
            Self::AbsoluteTimeout => "absolute_timeout",
            Self::ManualLogout => "manual_logout",
        }
    }
}

impl fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of session validity, computed fresh on every check.
///
/// Never persisted and never mutated: the calculator builds a new one each
/// time, so two snapshots taken with no intervening writes and a frozen
/// clock compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// `true` while both timeout budgets have time left.
    pub is_valid: bool,
    /// Populated only when `is_valid` is false.
    pub reason: Option<ExpiryReason>,
    /// Time left before idle expiry. Zero once expired.
    pub idle_remaining: Duration,
    /// Time left before absolute expiry. Zero once expired.
    pub absolute_remaining: Duration,
    /// `true` while valid but within `warning_lead` of either expiry.
    pub should_warn: bool,
}

impl SessionState {
    /// The state reported when no record exists.
    pub fn no_session() -> Self {
        Self {
            is_valid: false,
            reason: Some(ExpiryReason::NoSession),
            idle_remaining: Duration::ZERO,
            absolute_remaining: Duration::ZERO,
            should_warn: false,
        }
    }

    /// Time until whichever expiry comes first.
    pub fn time_remaining(&self) -> Duration {
        self.idle_remaining.min(self.absolute_remaining)
    }
}
