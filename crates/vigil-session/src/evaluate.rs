//! The session state calculator.
//!
//! One pure function: record + config + now -> state. No clock access, no
//! storage, no errors. The coordinator and the store both lean on this
//! being total and deterministic; every timeout decision in the system
//! funnels through here.

use std::time::Duration;

use crate::{ExpiryReason, SessionConfig, SessionRecord, SessionState};

/// Computes the validity of a session at `now_ms`.
///
/// Rules:
/// - no record: invalid with [`ExpiryReason::NoSession`], zero remaining
///   on both budgets;
/// - `idle_remaining = idle_timeout - (now - last_activity)`, floored at
///   zero;
/// - `absolute_remaining = absolute_timeout - (now - started_at)`, floored
///   at zero;
/// - valid only while both remainders are positive;
/// - an exhausted idle budget wins the blame over an exhausted absolute
///   budget when both hit zero in the same check;
/// - `should_warn` while valid and within `warning_lead` of either expiry.
///
/// A clock that moved backwards (now before a stored timestamp) saturates
/// to zero elapsed, which reads as a full budget rather than an underflow.
pub fn evaluate(
    record: Option<&SessionRecord>,
    config: &SessionConfig,
    now_ms: u64,
) -> SessionState {
    let Some(record) = record else {
        return SessionState::no_session();
    };

    let idle_budget_ms = config.idle_timeout.as_millis() as u64;
    let absolute_budget_ms = config.absolute_timeout.as_millis() as u64;

    let idle_elapsed = now_ms.saturating_sub(record.last_activity_ms);
    let absolute_elapsed = now_ms.saturating_sub(record.started_at_ms);

    let idle_remaining_ms = idle_budget_ms.saturating_sub(idle_elapsed);
    let absolute_remaining_ms = absolute_budget_ms.saturating_sub(absolute_elapsed);

    let is_valid = idle_remaining_ms > 0 && absolute_remaining_ms > 0;

    let reason = if is_valid {
        None
    } else if idle_remaining_ms == 0 {
        Some(ExpiryReason::IdleTimeout)
    } else {
        Some(ExpiryReason::AbsoluteTimeout)
    };

    let warning_lead_ms = config.warning_lead.as_millis() as u64;
    let should_warn =
        is_valid && idle_remaining_ms.min(absolute_remaining_ms) <= warning_lead_ms;

    SessionState {
        is_valid,
        reason,
        idle_remaining: Duration::from_millis(idle_remaining_ms),
        absolute_remaining: Duration::from_millis(absolute_remaining_ms),
        should_warn,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The numeric scenarios here mirror a 15-minute idle / 8-hour
    //! absolute / 60-second warning configuration, checked at hand-picked
    //! instants around each boundary. All times are driven explicitly;
    //! nothing reads the wall clock.

    use super::*;

    // -- Helpers ----------------------------------------------------------

    /// 15 min idle, 8 h absolute, 60 s warning lead, 10 s checks.
    fn config() -> SessionConfig {
        SessionConfig {
            idle_timeout: Duration::from_millis(900_000),
            absolute_timeout: Duration::from_millis(28_800_000),
            warning_lead: Duration::from_millis(60_000),
            check_interval: Duration::from_millis(10_000),
        }
    }

    const T0: u64 = 1_700_000_000_000;

    // =====================================================================
    // No record
    // =====================================================================

    #[test]
    fn test_evaluate_no_record_reports_no_session() {
        let state = evaluate(None, &config(), T0);
        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::NoSession));
        assert_eq!(state.idle_remaining, Duration::ZERO);
        assert_eq!(state.absolute_remaining, Duration::ZERO);
        assert!(!state.should_warn);
    }

    // =====================================================================
    // Fresh record
    // =====================================================================

    #[test]
    fn test_evaluate_fresh_record_is_valid_and_unwarned() {
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0);

        assert!(state.is_valid);
        assert_eq!(state.reason, None);
        assert!(!state.should_warn);
        assert_eq!(state.idle_remaining, Duration::from_millis(900_000));
        assert_eq!(state.absolute_remaining, Duration::from_millis(28_800_000));
    }

    // =====================================================================
    // Warning window (Scenario A)
    // =====================================================================

    #[test]
    fn test_evaluate_just_outside_warning_window_stays_quiet() {
        // 839 000 ms in: idle remaining is 61 000 ms, one second outside
        // the 60 000 ms lead.
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 + 839_000);

        assert!(state.is_valid);
        assert!(!state.should_warn);
        assert_eq!(state.idle_remaining, Duration::from_millis(61_000));
    }

    #[test]
    fn test_evaluate_inside_warning_window_warns_while_valid() {
        // 840 001 ms in: idle remaining is 59 999 ms, inside the lead.
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 + 840_001);

        assert!(state.is_valid);
        assert!(state.should_warn);
        assert_eq!(state.reason, None);
        assert_eq!(state.idle_remaining, Duration::from_millis(59_999));
    }

    #[test]
    fn test_evaluate_warning_boundary_is_inclusive() {
        // Remaining exactly equal to the lead already warns.
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 + 840_000);

        assert!(state.is_valid);
        assert!(state.should_warn);
        assert_eq!(state.idle_remaining, Duration::from_millis(60_000));
    }

    // =====================================================================
    // Idle expiry (Scenario B)
    // =====================================================================

    #[test]
    fn test_evaluate_past_idle_timeout_reports_idle_expiry() {
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 + 900_001);

        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::IdleTimeout));
        assert_eq!(state.idle_remaining, Duration::ZERO);
        assert!(!state.should_warn, "expired sessions never warn");
    }

    #[test]
    fn test_evaluate_exactly_at_idle_timeout_is_already_invalid() {
        // elapsed == budget leaves zero remaining, and zero is not valid.
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 + 900_000);

        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::IdleTimeout));
    }

    // =====================================================================
    // Activity restarts the idle window (Scenario C)
    // =====================================================================

    #[test]
    fn test_evaluate_recent_activity_restarts_idle_window() {
        // Session started at T0, activity arrived at T0 + 800 000. A check
        // at T0 + 900 000 (only 100 000 ms after the activity) is valid,
        // even though the session itself is 900 000 ms old.
        let mut rec = SessionRecord::new(T0);
        rec.touch(T0 + 800_000);

        let state = evaluate(Some(&rec), &config(), T0 + 900_000);

        assert!(state.is_valid);
        assert_eq!(state.idle_remaining, Duration::from_millis(800_000));
    }

    #[test]
    fn test_evaluate_touch_resets_idle_but_not_absolute() {
        let mut rec = SessionRecord::new(T0);
        let before = evaluate(Some(&rec), &config(), T0 + 500_000);

        rec.touch(T0 + 500_000);
        let after = evaluate(Some(&rec), &config(), T0 + 500_000);

        assert_eq!(after.idle_remaining, Duration::from_millis(900_000));
        assert_eq!(
            after.absolute_remaining, before.absolute_remaining,
            "activity must not extend the absolute budget"
        );
    }

    // =====================================================================
    // Absolute expiry
    // =====================================================================

    #[test]
    fn test_evaluate_absolute_timeout_with_recent_activity() {
        // The user kept typing for eight hours straight: idle is fine,
        // absolute is spent.
        let mut rec = SessionRecord::new(T0);
        rec.touch(T0 + 28_800_000);

        let state = evaluate(Some(&rec), &config(), T0 + 28_800_000);

        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::AbsoluteTimeout));
        assert_eq!(state.absolute_remaining, Duration::ZERO);
        assert!(state.idle_remaining > Duration::ZERO);
    }

    #[test]
    fn test_evaluate_absolute_warning_fires_near_end_of_life() {
        let mut rec = SessionRecord::new(T0);
        // Stay active until just inside the absolute warning window.
        rec.touch(T0 + 28_750_000);

        let state = evaluate(Some(&rec), &config(), T0 + 28_750_000);

        assert!(state.is_valid);
        assert!(state.should_warn, "50s of absolute budget left");
        assert_eq!(state.absolute_remaining, Duration::from_millis(50_000));
    }

    // =====================================================================
    // Tie-breaking and edge cases
    // =====================================================================

    #[test]
    fn test_evaluate_simultaneous_expiry_blames_idle() {
        // Idle and absolute run out on the same check: idle wins the
        // blame, per the tie rule.
        let cfg = SessionConfig {
            idle_timeout: Duration::from_millis(1_000),
            absolute_timeout: Duration::from_millis(1_000),
            warning_lead: Duration::from_millis(100),
            check_interval: Duration::from_millis(100),
        };
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &cfg, T0 + 1_000);

        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::IdleTimeout));
    }

    #[test]
    fn test_evaluate_clock_regression_saturates_to_full_budget() {
        // The wall clock moved backwards past the record's timestamps.
        // Elapsed saturates to zero, so the session reads as brand new
        // instead of underflowing.
        let rec = SessionRecord::new(T0);
        let state = evaluate(Some(&rec), &config(), T0 - 5_000);

        assert!(state.is_valid);
        assert_eq!(state.idle_remaining, Duration::from_millis(900_000));
        assert_eq!(state.absolute_remaining, Duration::from_millis(28_800_000));
    }

    #[test]
    fn test_evaluate_is_deterministic_for_identical_inputs() {
        let rec = SessionRecord::new(T0);
        let now = T0 + 840_500;

        let first = evaluate(Some(&rec), &config(), now);
        let second = evaluate(Some(&rec), &config(), now);

        assert_eq!(first, second);
    }
}
