//! # Vigil
//!
//! Session lifecycle management for interactive applications: idle and
//! absolute timeouts, ahead-of-expiry warnings, and coordinated logout
//! with an external auth provider.
//!
//! The host application supplies three things: a storage backend for the
//! session record, an input event hub fed from its UI surface, and an
//! [`AuthProvider`] implementation for its identity service. Vigil runs
//! the rest as a single coordinator task:
//!
//! ```text
//! input events ──→ IdleMonitor ──→ ┌─────────────────┐
//!                                  │   Coordinator    │──→ SessionView
//! auth events  ──────────────────→ │ (one tokio task) │     (watch)
//!                                  └────────┬────────┘
//! PollScheduler ──(periodic check)──────────┘
//!                            │
//!                      SessionStore ──→ evaluate()
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil::{
//!     InputEvents, MemoryBackend, SessionConfig, SessionCoordinator,
//!     SessionStore, SystemClock,
//! };
//!
//! # async fn run(auth: Arc<impl vigil::AuthProvider>) {
//! let events = InputEvents::new();
//! let store = SessionStore::new(
//!     MemoryBackend::new(),
//!     SessionConfig::default(),
//!     Arc::new(SystemClock),
//! );
//! let handle = SessionCoordinator::spawn(store, events.clone(), auth);
//!
//! // Feed events.emit(..) from the input surface, render handle.view(),
//! // and wire extend/dismiss/end to the warning dialog.
//! # }
//! ```

mod auth;
mod coordinator;
mod error;
mod handle;
mod view;

pub use auth::{AuthError, AuthEvent, AuthProvider, SignOutScope, UserId};
pub use coordinator::SessionCoordinator;
pub use error::VigilError;
pub use handle::SessionHandle;
pub use view::{SessionView, format_remaining, logout_destination};

// The lower layers, re-exported so applications depend on one crate.
pub use vigil_activity::{ActivityKind, IdleMonitor, InputEvents, MonitorConfig};
pub use vigil_poll::{CheckInfo, PollConfig, PollScheduler};
pub use vigil_session::{
    Clock, ExpiryReason, ManualClock, SessionConfig, SessionRecord, SessionState,
    SystemClock, evaluate,
};
pub use vigil_store::{
    FileBackend, MemoryBackend, SESSION_KEY, SessionStore, StorageBackend, StoreError,
};
