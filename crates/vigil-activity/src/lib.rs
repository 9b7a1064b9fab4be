//! User activity detection for Vigil.
//!
//! The session layer needs one bit of information from the outside world:
//! "the user just did something". This crate turns whatever input surface
//! the host application has into that bit, throttled so a busy user does
//! not hammer the session store.
//!
//! 1. **Hub** ([`InputEvents`]) - a cloneable broadcast bus the host
//!    feeds from its real input source (terminal reader, GUI event loop,
//!    gateway, test driver).
//! 2. **Monitor** ([`IdleMonitor`]) - subscribes to the hub, keeps at
//!    most one report per throttle window, and forwards reports to the
//!    coordinator.
//!
//! A headless host simply never emits into the hub; the monitor then sits
//! idle, which is the correct behavior when there is no UI surface to
//! watch.

mod events;
mod monitor;

pub use events::{ActivityKind, InputEvents};
pub use monitor::{IdleMonitor, MonitorConfig};
