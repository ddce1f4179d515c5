//! Session store contract.
//!
//! The remote identity/profile store is an external collaborator; the core
//! consumes it through this trait and never assumes two calls observe a
//! consistent joint snapshot. Each call is atomic from the core's side.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::common::StoreError;
use crate::domains::auth::models::{Profile, ProfileChanges, RegistrationData, Session};

/// Pushed notification about session state. Transient: consumed during the
/// current resolution, never cached.
#[derive(Debug, Clone)]
pub enum AuthChangeEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
    /// Snapshot delivered to a fresh subscriber. A `None` here means "no
    /// session yet", which is not a failure.
    InitialSession(Option<Session>),
}

/// Handle on the auth event stream. The snapshot event is delivered first,
/// then live events in order. Dropping the handle (or calling
/// [`unsubscribe`](Self::unsubscribe)) releases the subscription; no events
/// are delivered after that.
pub struct AuthSubscription {
    initial: Option<AuthChangeEvent>,
    rx: broadcast::Receiver<AuthChangeEvent>,
}

impl AuthSubscription {
    pub fn new(initial: Option<AuthChangeEvent>, rx: broadcast::Receiver<AuthChangeEvent>) -> Self {
        Self { initial, rx }
    }

    /// Next event, or `None` once the stream is closed. A slow consumer that
    /// misses broadcast slots skips to the oldest retained event.
    pub async fn recv(&mut self) -> Option<AuthChangeEvent> {
        if let Some(event) = self.initial.take() {
            return Some(event);
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Release the subscription explicitly.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Read/sign-in surface of the remote store.
///
/// Absence of a session or profile is `Ok(None)`, a valid state. Transport
/// and provider failures are errors and propagate to the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, StoreError>;

    /// Profile of the current session's user. No session or no profile row
    /// both yield `Ok(None)`.
    async fn get_profile(&self) -> Result<Option<Profile>, StoreError>;

    /// Request a sign-in link/code for a normalized email address. The
    /// implementation supplies the fixed callback-return address.
    async fn sign_in_with_email(&self, email: &str) -> Result<(), StoreError>;

    /// Request a sign-in code for an E.164 phone number.
    async fn sign_in_with_phone(&self, phone: &str) -> Result<(), StoreError>;

    async fn sign_out(&self) -> Result<(), StoreError>;

    /// Subscribe to session state changes. The returned handle yields an
    /// `InitialSession` snapshot first.
    async fn on_auth_state_change(&self) -> AuthSubscription;

    /// Complete registration with an invitation code. `Ok(false)` means the
    /// store refused without a distinguished reason;
    /// `Err(StoreError::InvitationCode)` means the code was rejected.
    async fn complete_registration(&self, data: &RegistrationData) -> Result<bool, StoreError>;

    /// Update the current user's profile. Fails with
    /// `StoreError::NotAuthenticated` before any network call when there is
    /// no session.
    async fn update_profile(&self, changes: &ProfileChanges) -> Result<(), StoreError>;

    /// Derived from the profile; an absent profile is not an admin.
    async fn is_admin(&self) -> Result<bool, StoreError> {
        Ok(self
            .get_profile()
            .await?
            .map(|profile| profile.is_admin)
            .unwrap_or(false))
    }
}
