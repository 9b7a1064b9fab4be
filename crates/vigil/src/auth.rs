//! The auth provider seam.
//!
//! Vigil does not implement authentication. It asks three things of
//! whatever identity service the application uses (OIDC, a hosted auth
//! platform, a custom token service): who is signed in right now, a
//! stream of sign-in/sign-out events, and a way to request sign-out.
//! Implement [`AuthProvider`] against that service and the coordinator
//! does the rest.

use std::fmt;

use tokio::sync::broadcast;

/// An authenticated principal, as named by the auth provider.
///
/// Opaque to Vigil; it only flows through logs and equality checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Auth state changes pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A principal signed in (fresh sign-in or restored session).
    SignedIn(UserId),
    /// The current principal signed out.
    SignedOut,
}

/// How far a sign-out should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutScope {
    /// Only this device / this client.
    Local,
    /// Every device where the principal is signed in.
    Global,
}

/// Errors from the auth provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider could not be reached.
    #[error("auth provider unreachable: {0}")]
    Unreachable(String),

    /// The provider refused the operation.
    #[error("auth operation rejected: {0}")]
    Rejected(String),
}

/// The contract between Vigil and the application's identity service.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the coordinator shares the provider
/// with a detached sign-out task and both may run on different threads.
///
/// # Example
///
/// ```rust
/// use tokio::sync::broadcast;
/// use vigil::{AuthError, AuthEvent, AuthProvider, SignOutScope, UserId};
///
/// /// A provider with one fixed principal. Useful in development and
/// /// in tests; a real implementation talks to an identity service.
/// struct StaticAuth {
///     user: UserId,
///     events: broadcast::Sender<AuthEvent>,
/// }
///
/// impl AuthProvider for StaticAuth {
///     async fn current_user(&self) -> Option<UserId> {
///         Some(self.user.clone())
///     }
///
///     fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
///         self.events.subscribe()
///     }
///
///     async fn sign_out(&self, _scope: SignOutScope) -> Result<(), AuthError> {
///         let _ = self.events.send(AuthEvent::SignedOut);
///         Ok(())
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync + 'static {
    /// The currently authenticated principal, if any.
    fn current_user(&self) -> impl Future<Output = Option<UserId>> + Send;

    /// Subscribes to auth state changes. Called once per coordinator,
    /// before its task starts, so no event is missed.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Requests a sign-out with the given scope.
    ///
    /// The coordinator treats failure as non-blocking: local cleanup and
    /// the redirect have already happened by the time this is awaited.
    fn sign_out(
        &self,
        scope: SignOutScope,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}
