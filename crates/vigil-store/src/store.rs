//! The session store: session-shaped operations over a storage backend.

use std::sync::Arc;

use vigil_session::{Clock, SessionConfig, SessionRecord, SessionState, evaluate};

/// The fixed, namespaced key the session record lives under.
///
/// One record per storage partition. Two stores sharing a backend root
/// share a session, the same way two tabs share browser storage.
pub const SESSION_KEY: &str = "vigil.session";

/// Owns the persisted [`SessionRecord`] and nothing else.
///
/// This is the only component in the system that writes session
/// timestamps. The coordinator holds the store; everyone else sees only
/// derived [`SessionState`] values.
///
/// ## Lifecycle of the record
///
/// ```text
/// initialize_session() ──→ update_last_activity() ──→ clear_session()
///      (sign-in)              (each activity tick)       (sign-out or
///                                                         expiry)
/// ```
///
/// All operations are synchronous local storage access; none of them can
/// fail from the caller's point of view. See the crate docs for the
/// failure direction.
pub struct SessionStore<B> {
    backend: B,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl<B: crate::StorageBackend> SessionStore<B> {
    /// Creates a store. The config is validated here once, so every
    /// downstream consumer sees the clamped values.
    pub fn new(backend: B, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            config: config.validated(),
        }
    }

    /// The validated timing configuration this store evaluates against.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The clock shared with this store.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Starts a fresh session: both timestamps set to now, any previous
    /// record overwritten.
    pub fn initialize_session(&mut self) -> SessionRecord {
        let record = SessionRecord::new(self.clock.now_ms());
        self.write(&record);
        tracing::info!(started_at_ms = record.started_at_ms, "session initialized");
        record
    }

    /// Registers activity: rewrites `last_activity_ms` only.
    ///
    /// With no existing record this is a silent no-op. Activity observed
    /// before sign-in must not manufacture a session; only
    /// [`initialize_session`](Self::initialize_session) creates one.
    pub fn update_last_activity(&mut self) {
        let Some(mut record) = self.record() else {
            tracing::trace!("activity with no session record, ignoring");
            return;
        };
        record.touch(self.clock.now_ms());
        self.write(&record);
    }

    /// Reads the current record and evaluates it against the config at
    /// the clock's now. Always returns a state; an unreadable or missing
    /// record evaluates as no session.
    pub fn get_session_state(&self) -> SessionState {
        evaluate(self.record().as_ref(), &self.config, self.clock.now_ms())
    }

    /// Deletes the persisted record.
    pub fn clear_session(&mut self) {
        if let Err(e) = self.backend.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "failed to clear session record");
        }
    }

    /// The raw persisted record, if one exists and parses.
    ///
    /// Both failure modes (backend error, malformed value) are logged and
    /// reported as absence; the caller re-initializes on the next valid
    /// auth detection rather than trusting a record nobody can read.
    pub fn record(&self) -> Option<SessionRecord> {
        let raw = match self.backend.load(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session record, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "malformed session record, treating as absent");
                None
            }
        }
    }

    fn write(&mut self, record: &SessionRecord) {
        // Serializing two integers cannot realistically fail, but the
        // backend write can; either way the record simply stays stale,
        // which shortens the session rather than lengthening it.
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session record");
                return;
            }
        };
        if let Err(e) = self.backend.save(SESSION_KEY, &raw) {
            tracing::warn!(error = %e, "failed to write session record");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vigil_session::{ExpiryReason, ManualClock};

    use super::*;
    use crate::{MemoryBackend, StoreError};
    use crate::backend::StorageBackend;

    // -- Helpers ----------------------------------------------------------

    const T0: u64 = 1_700_000_000_000;

    fn test_config() -> SessionConfig {
        SessionConfig {
            idle_timeout: Duration::from_secs(900),
            absolute_timeout: Duration::from_secs(28_800),
            warning_lead: Duration::from_secs(60),
            check_interval: Duration::from_secs(10),
        }
    }

    fn store_at_t0() -> (SessionStore<MemoryBackend>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let store = SessionStore::new(
            MemoryBackend::new(),
            test_config(),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (store, clock)
    }

    /// A backend where every operation fails, for the fail-safe paths.
    struct BrokenBackend;

    impl crate::StorageBackend for BrokenBackend {
        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("backend down")))
        }
        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("backend down")))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("backend down")))
        }
    }

    // =====================================================================
    // initialize_session()
    // =====================================================================

    #[test]
    fn test_initialize_session_creates_valid_record() {
        let (mut store, _clock) = store_at_t0();

        let record = store.initialize_session();

        assert_eq!(record.started_at_ms, T0);
        assert_eq!(record.last_activity_ms, T0);
        let state = store.get_session_state();
        assert!(state.is_valid);
        assert!(!state.should_warn);
    }

    #[test]
    fn test_initialize_session_overwrites_existing_record() {
        let (mut store, clock) = store_at_t0();
        store.initialize_session();

        clock.advance(Duration::from_secs(100));
        let record = store.initialize_session();

        assert_eq!(record.started_at_ms, T0 + 100_000);
        assert_eq!(
            store.record().unwrap().started_at_ms,
            T0 + 100_000,
            "old session start must not survive re-initialization"
        );
    }

    // =====================================================================
    // update_last_activity()
    // =====================================================================

    #[test]
    fn test_update_last_activity_resets_idle_window_only() {
        let (mut store, clock) = store_at_t0();
        store.initialize_session();

        clock.advance(Duration::from_secs(600));
        let before = store.get_session_state();
        store.update_last_activity();
        let after = store.get_session_state();

        assert_eq!(after.idle_remaining, Duration::from_secs(900));
        assert!(after.idle_remaining > before.idle_remaining);
        assert_eq!(
            after.absolute_remaining, before.absolute_remaining,
            "activity must leave the absolute budget alone"
        );
    }

    #[test]
    fn test_update_last_activity_without_record_is_a_noop() {
        // The documented edge: stray activity before sign-in creates
        // nothing.
        let (mut store, _clock) = store_at_t0();

        store.update_last_activity();

        assert!(store.record().is_none());
        assert_eq!(
            store.get_session_state().reason,
            Some(ExpiryReason::NoSession)
        );
    }

    // =====================================================================
    // get_session_state()
    // =====================================================================

    #[test]
    fn test_get_session_state_without_record_reports_no_session() {
        let (store, _clock) = store_at_t0();
        let state = store.get_session_state();
        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::NoSession));
    }

    #[test]
    fn test_get_session_state_is_idempotent_under_frozen_clock() {
        let (mut store, _clock) = store_at_t0();
        store.initialize_session();

        assert_eq!(store.get_session_state(), store.get_session_state());
    }

    #[test]
    fn test_get_session_state_reports_idle_expiry_after_timeout() {
        let (mut store, clock) = store_at_t0();
        store.initialize_session();

        clock.advance(Duration::from_secs(901));
        let state = store.get_session_state();

        assert!(!state.is_valid);
        assert_eq!(state.reason, Some(ExpiryReason::IdleTimeout));
    }

    #[test]
    fn test_malformed_record_reads_as_no_session() {
        let clock = Arc::new(ManualClock::new(T0));
        let mut backend = MemoryBackend::new();
        backend.save(SESSION_KEY, "{not json").unwrap();
        let store = SessionStore::new(backend, test_config(), clock as Arc<dyn Clock>);

        assert!(store.record().is_none());
        assert_eq!(
            store.get_session_state().reason,
            Some(ExpiryReason::NoSession)
        );
    }

    // =====================================================================
    // clear_session()
    // =====================================================================

    #[test]
    fn test_clear_session_deletes_record() {
        let (mut store, _clock) = store_at_t0();
        store.initialize_session();

        store.clear_session();

        assert!(store.record().is_none());
        assert_eq!(
            store.get_session_state().reason,
            Some(ExpiryReason::NoSession)
        );
    }

    #[test]
    fn test_clear_session_twice_is_safe() {
        let (mut store, _clock) = store_at_t0();
        store.initialize_session();
        store.clear_session();
        store.clear_session();
        assert!(store.record().is_none());
    }

    // =====================================================================
    // Broken backend: fail toward re-authentication
    // =====================================================================

    #[test]
    fn test_broken_backend_reads_as_no_session() {
        let clock = Arc::new(ManualClock::new(T0));
        let store = SessionStore::new(BrokenBackend, test_config(), clock as Arc<dyn Clock>);

        let state = store.get_session_state();

        assert!(!state.is_valid, "a session nobody can read is not valid");
        assert_eq!(state.reason, Some(ExpiryReason::NoSession));
    }

    #[test]
    fn test_broken_backend_never_panics_on_writes() {
        let clock = Arc::new(ManualClock::new(T0));
        let mut store =
            SessionStore::new(BrokenBackend, test_config(), clock as Arc<dyn Clock>);

        store.initialize_session();
        store.update_last_activity();
        store.clear_session();

        assert!(store.record().is_none());
    }
}
