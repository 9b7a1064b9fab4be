//! The session coordinator: one task that owns the whole lifecycle.
//!
//! The coordinator ties the layers together: it feeds activity reports
//! into the store, polls validity on a cadence, decides when the warning
//! is on screen, and runs the termination sequence when a session ends,
//! however it ends.
//!
//! ## Lifecycle
//!
//! ```text
//!            ┌──(activity / extend)──┐
//!            ▼                       │
//! [Signed out] ──(sign-in)──→ [Active] ──(inside lead)──→ [Warning]
//!      ▲                         │   ▲──(extend/activity)────┘ │
//!      │                         │                             │
//!      └──────(termination)──────┴──(expiry / sign-out event)──┘
//! ```
//!
//! Termination is single-flight: a failed check and a concurrent
//! sign-out notification both funnel into the same `end_session`
//! routine, and whichever arrives second is a no-op.
//!
//! There is deliberately no global instance. Construct one coordinator
//! per session surface, inject its collaborators, and keep the returned
//! [`SessionHandle`]; dropping every handle (or calling `shutdown`) ends
//! the task.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};

use vigil_activity::{ActivityKind, IdleMonitor, InputEvents, MonitorConfig};
use vigil_poll::{CheckInfo, PollConfig, PollScheduler};
use vigil_session::ExpiryReason;
use vigil_store::{SessionStore, StorageBackend};

use crate::view::{SessionView, format_remaining, logout_destination};
use crate::{AuthEvent, AuthProvider, SessionHandle, SignOutScope, UserId};

/// Requests from a [`SessionHandle`] to the coordinator task.
pub(crate) enum Command {
    /// Register activity and hide the warning ("keep me signed in").
    Extend,
    /// Hide the warning without registering activity.
    DismissWarning,
    /// End the session now with the given reason.
    End { reason: ExpiryReason },
    /// Tear down without signing out (unmount).
    Shutdown,
}

/// Spawns session coordinators.
pub struct SessionCoordinator;

impl SessionCoordinator {
    /// Starts a coordinator task over the given collaborators and
    /// returns the handle the UI layer keeps.
    ///
    /// The auth subscription is taken here, before the task starts, so a
    /// sign-out fired immediately after this call cannot be missed.
    pub fn spawn<B, A>(
        store: SessionStore<B>,
        events: InputEvents,
        auth: Arc<A>,
    ) -> SessionHandle
    where
        B: StorageBackend + 'static,
        A: AuthProvider,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SessionView::detached());
        let (activity_tx, activity_rx) = mpsc::unbounded_channel();

        let monitor = IdleMonitor::new(events, activity_tx, MonitorConfig::default());
        let scheduler = PollScheduler::new(PollConfig::with_interval(
            store.config().check_interval,
        ));
        let auth_events = auth.subscribe();

        let coordinator = Coordinator {
            store,
            auth,
            monitor,
            scheduler,
            activity: activity_rx,
            auth_events,
            auth_closed: false,
            commands: command_rx,
            view: view_tx,
            user: None,
            show_warning: false,
            warning_dismissed: false,
            ending: false,
            last_reason: None,
            redirect: None,
        };

        tokio::spawn(coordinator.run());

        SessionHandle::new(command_tx, view_rx)
    }
}

/// The coordinator task state. Everything mutable lives here, owned by
/// one task; the outside world only sees commands in and views out.
struct Coordinator<B, A> {
    store: SessionStore<B>,
    auth: Arc<A>,
    monitor: IdleMonitor,
    scheduler: PollScheduler,
    activity: mpsc::UnboundedReceiver<ActivityKind>,
    auth_events: broadcast::Receiver<AuthEvent>,
    auth_closed: bool,
    commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<SessionView>,

    /// The principal this coordinator believes is signed in.
    user: Option<UserId>,
    /// Whether the expiry warning is on screen.
    show_warning: bool,
    /// Set when the user dismissed the warning; cleared by activity.
    /// While set, checks do not re-show the warning.
    warning_dismissed: bool,
    /// Single-flight guard for the termination sequence.
    ending: bool,
    /// Why the last termination happened.
    last_reason: Option<ExpiryReason>,
    /// The one-shot post-logout destination.
    redirect: Option<String>,
}

impl<B, A> Coordinator<B, A>
where
    B: StorageBackend + 'static,
    A: AuthProvider,
{
    async fn run(mut self) {
        tracing::info!("session coordinator started");
        self.bootstrap().await;

        loop {
            tokio::select! {
                // Biased: activity reports must drain before a pending
                // check fires, so a check can never expire a session
                // whose activity is already queued.
                biased;

                cmd = self.commands.recv() => match cmd {
                    Some(Command::Extend) => self.handle_extend(),
                    Some(Command::DismissWarning) => self.handle_dismiss(),
                    Some(Command::End { reason }) => self.end_session(reason),
                    // Shutdown, or every handle dropped: unmount.
                    Some(Command::Shutdown) | None => break,
                },
                event = self.auth_events.recv(), if !self.auth_closed => {
                    self.handle_auth_event(event);
                }
                Some(_kind) = self.activity.recv() => self.handle_activity(),
                info = self.scheduler.wait_for_check() => self.handle_check(info),
            }
        }

        // Both cancellation primitives together on teardown; a leaked
        // listener would keep reporting against a torn-down UI.
        self.monitor.stop();
        self.scheduler.stop();
        tracing::info!("session coordinator stopped");
    }

    /// Initial sync with the auth provider.
    ///
    /// An authenticated principal with no (readable) local record gets a
    /// fresh one. A record that is already expired is left for the
    /// immediate first check, which runs the normal termination path.
    async fn bootstrap(&mut self) {
        match self.auth.current_user().await {
            Some(user) => {
                tracing::info!(%user, "authenticated principal detected");
                self.user = Some(user);
                if self.store.get_session_state().reason == Some(ExpiryReason::NoSession)
                {
                    self.store.initialize_session();
                }
                self.monitor.start();
                self.run_check();
            }
            None => {
                tracing::debug!("no authenticated principal, waiting for sign-in");
                self.scheduler.stop();
                self.publish();
            }
        }
    }

    fn handle_activity(&mut self) {
        if self.ending || self.user.is_none() {
            return;
        }
        self.store.update_last_activity();
        self.warning_dismissed = false;
        // The warning can come down right away if the restarted idle
        // window cleared its cause; putting it up stays the poll's job.
        if self.show_warning && !self.store.get_session_state().should_warn {
            self.show_warning = false;
        }
        self.publish();
    }

    fn handle_check(&mut self, info: CheckInfo) {
        if info.late {
            tracing::debug!(check = info.check, "late check, evaluating now");
        }
        self.run_check();
    }

    /// One validity check: the only place expiry is decided.
    fn run_check(&mut self) {
        if self.ending {
            return;
        }
        let state = self.store.get_session_state();

        if !state.is_valid {
            match state.reason {
                Some(
                    reason @ (ExpiryReason::IdleTimeout | ExpiryReason::AbsoluteTimeout),
                ) => {
                    self.end_session(reason);
                }
                // The record vanished (cleared storage, unreadable value)
                // while the principal is still authenticated: start a
                // fresh session rather than trusting the void.
                _ => {
                    if self.user.is_some() {
                        tracing::warn!(
                            "session record missing while signed in, reinitializing"
                        );
                        self.store.initialize_session();
                        self.publish();
                    }
                }
            }
            return;
        }

        if state.should_warn && !self.warning_dismissed && !self.show_warning {
            tracing::info!(
                remaining_ms = state.time_remaining().as_millis() as u64,
                "session expiry warning shown"
            );
            self.show_warning = true;
        } else if !state.should_warn && self.show_warning {
            self.show_warning = false;
        }
        self.publish();
    }

    fn handle_extend(&mut self) {
        if self.ending || self.user.is_none() {
            return;
        }
        self.store.update_last_activity();
        self.show_warning = false;
        self.warning_dismissed = false;
        tracing::info!("session extended");
        self.publish();
    }

    fn handle_dismiss(&mut self) {
        if self.ending || !self.show_warning {
            return;
        }
        self.show_warning = false;
        self.warning_dismissed = true;
        tracing::info!("expiry warning dismissed");
        self.publish();
    }

    fn handle_auth_event(&mut self, event: Result<AuthEvent, RecvError>) {
        match event {
            Ok(AuthEvent::SignedIn(user)) => self.handle_sign_in(user),
            Ok(AuthEvent::SignedOut) => {
                tracing::info!("auth provider reported sign-out");
                self.end_session(ExpiryReason::ManualLogout);
            }
            Err(RecvError::Lagged(missed)) => {
                // Auth events are rare; lagging here means the host is in
                // serious trouble. The session still expires by timeout.
                tracing::warn!(missed, "auth event stream lagged");
            }
            Err(RecvError::Closed) => {
                tracing::warn!("auth event stream closed, no further auth updates");
                self.auth_closed = true;
            }
        }
    }

    /// A (re-)sign-in: fresh record, everything restarted.
    fn handle_sign_in(&mut self, user: UserId) {
        tracing::info!(%user, "signed in, starting session");
        self.user = Some(user);
        self.ending = false;
        self.show_warning = false;
        self.warning_dismissed = false;
        self.last_reason = None;
        self.redirect = None;

        self.store.initialize_session();
        self.monitor.start();
        self.scheduler.restart();
        self.publish();
    }

    /// The termination sequence. Single-flight: concurrent triggers (a
    /// failed check racing an auth callback, a second explicit end) are
    /// suppressed here.
    fn end_session(&mut self, reason: ExpiryReason) {
        if self.ending {
            tracing::debug!(%reason, "termination already in flight, ignoring");
            return;
        }
        self.ending = true;
        tracing::info!(%reason, "ending session");

        self.monitor.stop();
        self.scheduler.stop();
        self.store.clear_session();

        self.user = None;
        self.show_warning = false;
        self.last_reason = Some(reason);
        self.redirect = Some(logout_destination(reason));

        // Publish the redirect before the provider round-trip: a slow or
        // failing sign-out must not keep a dead session on screen.
        self.publish();

        let auth = Arc::clone(&self.auth);
        tokio::spawn(async move {
            if let Err(e) = auth.sign_out(SignOutScope::Local).await {
                tracing::warn!(
                    error = %e,
                    "external sign-out failed, session already ended locally"
                );
            }
        });
    }

    /// Publishes a fresh view. Views are rebuilt from scratch each time;
    /// nothing in them is ever mutated in place.
    fn publish(&self) {
        let state = self.store.get_session_state();
        let view = SessionView {
            time_remaining: format_remaining(state.time_remaining()),
            session: state,
            show_timeout_warning: self.show_warning,
            timeout_reason: self.last_reason,
            redirect_to: self.redirect.clone(),
        };
        let _ = self.view.send(view);
    }
}
