//! Injectable time source.
//!
//! Session timestamps are wall-clock based (unix epoch milliseconds)
//! because the record is persisted and has to stay meaningful across
//! process restarts. A monotonic `Instant` would reset with the process.
//!
//! Everything that needs "now" takes a [`Clock`] instead of calling the
//! system clock directly, so the calculator and the store can be tested
//! against a frozen or hand-advanced clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of wall-clock time, in milliseconds since the unix epoch.
///
/// Object safe on purpose: the store and the coordinator hold an
/// `Arc<dyn Clock>` so one clock instance can drive several components.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the unix epoch.
    fn now_ms(&self) -> u64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 yields 0 rather than a panic.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A hand-driven clock for tests and harnesses.
///
/// Starts at a fixed instant and only moves when told to. Shared freely:
/// cloning an `Arc<ManualClock>` gives every component the same timeline.
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            ms: AtomicU64::new(start_ms),
        }
    }

    /// Jumps the clock to an absolute time.
    pub fn set_ms(&self, ms: u64) {
        self.ms.store(ms, Ordering::SeqCst);
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.ms.fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_frozen() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        assert_eq!(clock.now_ms(), 1_000, "must not move on its own");
    }

    #[test]
    fn test_manual_clock_advance_accumulates() {
        let clock = ManualClock::new(0);
        clock.advance(Duration::from_millis(500));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now_ms(), 1_500);
    }

    #[test]
    fn test_manual_clock_set_overrides() {
        let clock = ManualClock::new(10);
        clock.set_ms(99);
        assert_eq!(clock.now_ms(), 99);
    }

    #[test]
    fn test_system_clock_is_past_epoch() {
        // Sanity only: the real clock should be well past 2020.
        let clock = SystemClock;
        assert!(clock.now_ms() > 1_577_836_800_000);
    }
}
