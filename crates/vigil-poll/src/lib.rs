//! Periodic check scheduler for Vigil.
//!
//! Session expiry is detected by polling, not by a one-shot timer armed
//! at the predicted expiry instant. Polling is deliberately drift
//! tolerant: a suspended laptop, a throttled background process, or a
//! clock adjustment produces one late check and a clean resumption of
//! cadence instead of a missed or early expiry.
//!
//! # Integration
//!
//! The scheduler is designed to sit inside a coordinator's
//! `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* handle commands */ }
//!         info = scheduler.wait_for_check() => {
//!             run_validity_check(info);
//!         }
//!     }
//! }
//! ```
//!
//! While stopped (or configured with a zero interval) `wait_for_check`
//! pends forever, so the arm simply never fires and the other branches
//! keep running.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the poll scheduler.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Spacing between checks. Zero disables the scheduler entirely
    /// (it will pend forever until reconfigured).
    pub interval: Duration,

    /// Random jitter (up to this much) added before the *first* check, so
    /// many coordinators created at the same instant do not all poll in
    /// lockstep.
    pub initial_jitter: Duration,
}

impl PollConfig {
    /// A config for the given interval with default jitter.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            initial_jitter: Duration::from_millis(250),
        }
    }
}

// ---------------------------------------------------------------------------
// Check info
// ---------------------------------------------------------------------------

/// Information about a check that just came due, returned by
/// [`PollScheduler::wait_for_check`].
#[derive(Debug, Clone)]
pub struct CheckInfo {
    /// Monotonically increasing check number (starts at 1).
    pub check: u64,
    /// `true` if the scheduler woke significantly late (more than 10% of
    /// the interval past the deadline). Expected under host throttling;
    /// the next deadline is already rescheduled from now.
    pub late: bool,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives the periodic validity check for a single coordinator.
pub struct PollScheduler {
    interval: Option<Duration>,
    /// When the next check should fire. `None` until first scheduled.
    next_check: Option<Instant>,
    check_count: u64,
    late_count: u64,
    stopped: bool,
}

impl PollScheduler {
    /// Creates a scheduler from config. The first check is scheduled one
    /// interval (plus jitter) from now.
    pub fn new(config: PollConfig) -> Self {
        let interval = (!config.interval.is_zero()).then_some(config.interval);

        let next_check = interval.map(|iv| {
            let jitter = if config.initial_jitter.is_zero() {
                Duration::ZERO
            } else {
                let max_us = config.initial_jitter.as_micros() as u64;
                Duration::from_micros(rand::rng().random_range(0..max_us))
            };
            Instant::now() + iv + jitter
        });

        if let Some(iv) = interval {
            debug!(interval_ms = iv.as_millis() as u64, "poll scheduler created");
        } else {
            debug!("poll scheduler created disabled (zero interval)");
        }

        Self {
            interval,
            next_check,
            check_count: 0,
            late_count: 0,
            stopped: false,
        }
    }

    /// A scheduler for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(PollConfig::with_interval(interval))
    }

    /// Waits until the next check is due.
    ///
    /// Pends forever while stopped or disabled; `tokio::select!` still
    /// services its other branches.
    ///
    /// The next deadline is always rescheduled from *now*, never from the
    /// missed deadline, so a long host suspension yields exactly one
    /// (late) check rather than a catch-up burst.
    pub async fn wait_for_check(&mut self) -> CheckInfo {
        let (next, interval) = match (self.next_check, self.interval) {
            (Some(next), Some(iv)) if !self.stopped => (next, iv),
            _ => {
                // This future never completes; select! handles the rest.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.check_count += 1;

        let late_by = now.saturating_duration_since(next);
        let late = late_by > interval / 10;
        if late {
            self.late_count += 1;
            warn!(
                check = self.check_count,
                late_ms = late_by.as_millis() as u64,
                "validity check fired late, resuming cadence from now"
            );
        }

        self.next_check = Some(now + interval);
        trace!(check = self.check_count, late, "check due");

        CheckInfo {
            check: self.check_count,
            late,
        }
    }

    /// Stops the check loop; `wait_for_check` pends until
    /// [`restart`](Self::restart). Idempotent.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            debug!(check = self.check_count, "poll scheduler stopped");
        }
    }

    /// Resumes checking after a stop. The next deadline is reset to
    /// `now + interval`, so time spent stopped does not produce a late
    /// check. Idempotent.
    pub fn restart(&mut self) {
        if self.stopped {
            self.stopped = false;
            if let Some(iv) = self.interval {
                self.next_check = Some(Instant::now() + iv);
            }
            debug!(check = self.check_count, "poll scheduler restarted");
        }
    }

    /// Whether the scheduler is currently stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether this scheduler can ever fire (a non-zero interval).
    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Checks fired so far.
    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    /// Checks that fired late so far.
    pub fn late_count(&self) -> u64 {
        self.late_count
    }

    /// The configured interval, or `None` when disabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}
