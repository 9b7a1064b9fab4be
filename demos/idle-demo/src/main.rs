//! A compressed walk through a session's life.
//!
//! Runs a coordinator with second-scale timeouts and a scripted user:
//! some typing, then silence. Watch the warning appear, nobody react,
//! and the session idle out with a redirect.
//!
//! ```text
//! cargo run -p idle-demo
//! RUST_LOG=vigil=debug cargo run -p idle-demo   # with internal logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use vigil::{
    ActivityKind, AuthError, AuthEvent, AuthProvider, InputEvents, MemoryBackend,
    SessionConfig, SessionCoordinator, SessionStore, SignOutScope, SystemClock,
    UserId,
};

/// A provider with one fixed principal, for demonstration purposes.
struct DemoAuth {
    events: broadcast::Sender<AuthEvent>,
}

impl DemoAuth {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self { events })
    }
}

impl AuthProvider for DemoAuth {
    async fn current_user(&self) -> Option<UserId> {
        Some(UserId("demo-user".into()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_out(&self, scope: SignOutScope) -> Result<(), AuthError> {
        println!("  [auth] sign-out requested ({scope:?})");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Seconds where production uses minutes: 12s idle, 1min absolute,
    // warn 5s ahead, check every second.
    let config = SessionConfig {
        idle_timeout: Duration::from_secs(12),
        absolute_timeout: Duration::from_secs(60),
        warning_lead: Duration::from_secs(5),
        check_interval: Duration::from_secs(1),
    };

    let events = InputEvents::new();
    let store = SessionStore::new(MemoryBackend::new(), config, Arc::new(SystemClock));
    let handle = SessionCoordinator::spawn(store, events.clone(), DemoAuth::new());

    // The scripted user: types for six seconds, then walks away.
    tokio::spawn(async move {
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            events.emit(ActivityKind::KeyPress);
            println!("  [user] keypress");
        }
        println!("  [user] walks away");
    });

    println!("session started (12s idle timeout, warning 5s ahead)");

    let mut view = handle.subscribe();
    let mut warned = false;
    loop {
        if view.changed().await.is_err() {
            break;
        }
        let current = view.borrow_and_update().clone();

        if current.show_timeout_warning {
            if !warned {
                println!("  [ui] warning: session expires in {}", current.time_remaining);
                warned = true;
            }
        } else {
            warned = false;
        }

        if let Some(destination) = &current.redirect_to {
            let reason = current
                .timeout_reason
                .map(|r| r.as_str())
                .unwrap_or("unknown");
            println!("  [ui] session over ({reason}), redirecting to {destination}");
            break;
        }
    }

    let _ = handle.shutdown();
}
