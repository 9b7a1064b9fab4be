//! The input event hub.

use tokio::sync::broadcast;

/// The interaction categories that count as user activity.
///
/// Anything outside these four does not reset the idle window. The set is
/// fixed on purpose: adding a category silently lengthens sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Pointer movement.
    PointerMove,
    /// A key press.
    KeyPress,
    /// Scrolling.
    Scroll,
    /// A touch interaction.
    Touch,
}

/// A cloneable broadcast bus for raw input events.
///
/// The host application owns one of these and emits into it from its
/// input surface. Producers never block and never fail: emitting with no
/// subscriber attached is simply dropped, and a slow subscriber loses old
/// events rather than stalling the producer. Both are fine for activity
/// signals, where only "something happened recently" matters.
#[derive(Debug, Clone)]
pub struct InputEvents {
    tx: broadcast::Sender<ActivityKind>,
}

impl InputEvents {
    /// A hub with room for a short burst of unprocessed events.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// A hub with an explicit buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes one raw input event.
    pub fn emit(&self, kind: ActivityKind) {
        // No subscribers is not an error; there is just nobody watching.
        let _ = self.tx.send(kind);
    }

    /// Attaches a new subscriber. Events emitted after this call are
    /// delivered; events from before it are not.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityKind> {
        self.tx.subscribe()
    }
}

impl Default for InputEvents {
    fn default() -> Self {
        Self::new()
    }
}
