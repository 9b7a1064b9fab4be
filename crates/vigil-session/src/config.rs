//! Session timing configuration.

use std::time::Duration;

use tracing::warn;

/// Timing rules for a session. One config drives a whole coordinator;
/// callers customize individual fields and keep the defaults for the rest.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inactivity budget. A session with no detected activity for this
    /// long is idle-expired.
    pub idle_timeout: Duration,

    /// Maximum total session lifetime, regardless of activity.
    pub absolute_timeout: Duration,

    /// How far ahead of either expiry the user is warned.
    pub warning_lead: Duration,

    /// Cadence of the periodic validity check.
    pub check_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(15 * 60),
            absolute_timeout: Duration::from_secs(8 * 60 * 60),
            warning_lead: Duration::from_secs(60),
            check_interval: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Invariants enforced:
    /// - both timeouts and the check interval are non-zero (zeros fall
    ///   back to the defaults),
    /// - `warning_lead` is strictly below `min(idle_timeout,
    ///   absolute_timeout)`.
    ///
    /// A `check_interval` larger than `warning_lead` is legal but means
    /// the warning window can be skipped over entirely, so it logs a
    /// warning and is otherwise left alone.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.idle_timeout.is_zero() {
            warn!("idle_timeout of zero is not usable, falling back to default");
            self.idle_timeout = defaults.idle_timeout;
        }
        if self.absolute_timeout.is_zero() {
            warn!("absolute_timeout of zero is not usable, falling back to default");
            self.absolute_timeout = defaults.absolute_timeout;
        }
        if self.check_interval.is_zero() {
            warn!("check_interval of zero would never poll, falling back to default");
            self.check_interval = defaults.check_interval;
        }

        let cap = self.idle_timeout.min(self.absolute_timeout);
        if self.warning_lead >= cap {
            let clamped = cap.saturating_sub(Duration::from_millis(1));
            warn!(
                lead_ms = self.warning_lead.as_millis() as u64,
                cap_ms = cap.as_millis() as u64,
                "warning_lead must stay below both timeouts, clamping"
            );
            self.warning_lead = clamped;
        }

        if !self.warning_lead.is_zero() && self.check_interval > self.warning_lead {
            warn!(
                check_ms = self.check_interval.as_millis() as u64,
                lead_ms = self.warning_lead.as_millis() as u64,
                "check_interval exceeds warning_lead, warnings may be missed"
            );
        }

        self
    }
}
