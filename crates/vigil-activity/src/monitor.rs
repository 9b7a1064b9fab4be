//! The idle monitor: from raw input events to throttled activity reports.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::{ActivityKind, InputEvents};

/// Tuning for the idle monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Minimum spacing between two activity reports. Raw events arriving
    /// inside the window are dropped; pointer movement alone can produce
    /// hundreds of events per second and each report costs a storage
    /// write.
    pub min_report_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            min_report_interval: Duration::from_millis(500),
        }
    }
}

/// Watches an [`InputEvents`] hub and forwards at most one activity
/// report per throttle window to the coordinator's channel.
///
/// ```text
/// InputEvents ──(raw, bursty)──→ IdleMonitor ──(≤1 per window)──→ reports
/// ```
///
/// `start` and `stop` are both idempotent and the pair can be cycled:
/// stop on termination, start again when the user signs back in.
pub struct IdleMonitor {
    events: InputEvents,
    reports: mpsc::UnboundedSender<ActivityKind>,
    config: MonitorConfig,
    /// Present while the listener task is running. Doubles as the
    /// shutdown signal and the double-start guard.
    shutdown: Option<watch::Sender<bool>>,
}

impl IdleMonitor {
    /// Creates a monitor that will report into `reports`.
    ///
    /// Nothing is attached until [`start`](Self::start).
    pub fn new(
        events: InputEvents,
        reports: mpsc::UnboundedSender<ActivityKind>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            events,
            reports,
            config,
            shutdown: None,
        }
    }

    /// Attaches to the hub and begins reporting.
    ///
    /// Calling this while already started does nothing; one listener,
    /// one report stream, no matter how many times the caller starts it.
    pub fn start(&mut self) {
        if self.shutdown.is_some() {
            debug!("idle monitor already started, ignoring");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        // Subscribe before spawning so no event emitted after start() can
        // fall in a gap.
        let rx = self.events.subscribe();
        let reports = self.reports.clone();
        let min_interval = self.config.min_report_interval;

        tokio::spawn(listen(rx, reports, min_interval, shutdown_rx));
        self.shutdown = Some(shutdown_tx);
        debug!(window_ms = min_interval.as_millis() as u64, "idle monitor started");
    }

    /// Detaches from the hub. Safe to call when not started.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
            debug!("idle monitor stopped");
        }
    }

    /// Whether the listener task is currently attached.
    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }
}

/// The listener task: receive, throttle, forward.
async fn listen(
    mut rx: broadcast::Receiver<ActivityKind>,
    reports: mpsc::UnboundedSender<ActivityKind>,
    min_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last_report: Option<Instant> = None;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = rx.recv() => match event {
                Ok(kind) => {
                    let now = Instant::now();
                    let due = last_report
                        .is_none_or(|at| now.duration_since(at) >= min_interval);
                    if !due {
                        trace!(?kind, "activity inside throttle window, dropped");
                        continue;
                    }
                    last_report = Some(now);
                    if reports.send(kind).is_err() {
                        // Coordinator is gone; nothing left to report to.
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Activity is lossy by nature; the next event carries
                    // the same information as the missed ones.
                    trace!(missed, "activity events lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
