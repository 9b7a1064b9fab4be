//! Handle to a running session coordinator.

use tokio::sync::{mpsc, watch};

use vigil_session::ExpiryReason;

use crate::coordinator::Command;
use crate::{SessionView, VigilError};

/// Handle to a running [`SessionCoordinator`](crate::SessionCoordinator)
/// task. Cheap to clone; every clone talks to the same coordinator.
///
/// The UI layer holds one of these: it renders from
/// [`view`](Self::view) / [`subscribe`](Self::subscribe) and wires the
/// warning dialog's buttons to [`extend_session`](Self::extend_session),
/// [`dismiss_warning`](Self::dismiss_warning), and
/// [`end_session`](Self::end_session).
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        view: watch::Receiver<SessionView>,
    ) -> Self {
        Self { commands, view }
    }

    /// "Keep me signed in": registers activity and hides the warning.
    pub fn extend_session(&self) -> Result<(), VigilError> {
        self.send(Command::Extend)
    }

    /// Hides the warning without registering activity. It will not
    /// reappear until real activity restarts the idle window (or the
    /// session expires).
    pub fn dismiss_warning(&self) -> Result<(), VigilError> {
        self.send(Command::DismissWarning)
    }

    /// Ends the session now. `None` reads as a manual logout.
    pub fn end_session(&self, reason: Option<ExpiryReason>) -> Result<(), VigilError> {
        self.send(Command::End {
            reason: reason.unwrap_or(ExpiryReason::ManualLogout),
        })
    }

    /// Tears the coordinator down without signing out: listeners and the
    /// poll loop stop, the persisted record stays. This is the unmount
    /// path; a new coordinator over the same store resumes the session.
    pub fn shutdown(&self) -> Result<(), VigilError> {
        self.send(Command::Shutdown)
    }

    /// The current session view.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// A receiver that yields a change notification for every published
    /// view. Each subscriber observes the latest state.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    fn send(&self, command: Command) -> Result<(), VigilError> {
        self.commands
            .send(command)
            .map_err(|_| VigilError::Closed)
    }
}
