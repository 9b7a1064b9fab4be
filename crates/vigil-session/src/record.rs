//! The persisted session record.

use serde::{Deserialize, Serialize};

/// What actually gets persisted for a session: two timestamps.
///
/// - `started_at_ms` is written once, when the session begins.
/// - `last_activity_ms` is rewritten on every (throttled) activity report.
///
/// Both are unix-epoch milliseconds so the record survives process
/// restarts. Everything else about a session is derived on the fly by
/// [`evaluate`](crate::evaluate) and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When this session began.
    pub started_at_ms: u64,
    /// When activity was last observed.
    pub last_activity_ms: u64,
}

impl SessionRecord {
    /// A fresh record: started now, active now.
    pub fn new(now_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            last_activity_ms: now_ms,
        }
    }

    /// Registers activity. The session start is deliberately untouched;
    /// only the idle window restarts.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }
}
