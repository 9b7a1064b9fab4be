//! The UI-facing session snapshot.

use std::time::Duration;

use vigil_session::{ExpiryReason, SessionState};

/// Everything the UI layer needs to render session status.
///
/// Published through a `watch` channel on every state change: the
/// warning banner binds to `show_timeout_warning` and `time_remaining`,
/// and navigation fires exactly once when `redirect_to` becomes set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// The freshly computed validity snapshot.
    pub session: SessionState,
    /// Whether the expiry warning should be on screen.
    pub show_timeout_warning: bool,
    /// Why the session ended, once it has.
    pub timeout_reason: Option<ExpiryReason>,
    /// Time until the sooner expiry, preformatted for display.
    pub time_remaining: String,
    /// Where to send the user after the session ended. Carries the
    /// expiry reason as a query parameter.
    pub redirect_to: Option<String>,
}

impl SessionView {
    /// The view before any principal is known.
    pub(crate) fn detached() -> Self {
        let session = SessionState::no_session();
        Self {
            time_remaining: format_remaining(session.time_remaining()),
            session,
            show_timeout_warning: false,
            timeout_reason: None,
            redirect_to: None,
        }
    }
}

/// Formats a remaining duration as `m:ss`, or `h:mm:ss` from one hour up.
///
/// Sub-second remainders truncate toward zero: the displayed time never
/// promises more than is actually left.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// The post-logout destination for a given expiry reason.
pub fn logout_destination(reason: ExpiryReason) -> String {
    format!("/login?reason={}", reason.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining_minutes_and_seconds() {
        assert_eq!(format_remaining(Duration::from_secs(0)), "0:00");
        assert_eq!(format_remaining(Duration::from_secs(59)), "0:59");
        assert_eq!(format_remaining(Duration::from_secs(60)), "1:00");
        assert_eq!(format_remaining(Duration::from_secs(14 * 60 + 32)), "14:32");
    }

    #[test]
    fn test_format_remaining_with_hours() {
        assert_eq!(format_remaining(Duration::from_secs(3600)), "1:00:00");
        assert_eq!(
            format_remaining(Duration::from_secs(7 * 3600 + 59 * 60 + 59)),
            "7:59:59"
        );
    }

    #[test]
    fn test_format_remaining_truncates_subsecond() {
        assert_eq!(format_remaining(Duration::from_millis(59_999)), "0:59");
    }

    #[test]
    fn test_logout_destination_carries_reason() {
        assert_eq!(
            logout_destination(ExpiryReason::IdleTimeout),
            "/login?reason=idle_timeout"
        );
        assert_eq!(
            logout_destination(ExpiryReason::ManualLogout),
            "/login?reason=manual_logout"
        );
    }

    #[test]
    fn test_detached_view_shape() {
        let view = SessionView::detached();
        assert!(!view.session.is_valid);
        assert!(!view.show_timeout_warning);
        assert_eq!(view.time_remaining, "0:00");
        assert_eq!(view.redirect_to, None);
    }
}
