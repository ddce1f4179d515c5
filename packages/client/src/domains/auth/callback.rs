//! Callback resolution after an out-of-band sign-in link is followed.
//!
//! Two independent signals race on arrival: the auth-state subscription
//! (push) and an explicit session query (pull). The query exists because a
//! page reload on the callback URL does not replay the sign-in transition;
//! the subscription exists because some backends deliver completion only as
//! an event. Whichever signal lands first decides: the resolved flag is
//! checked-and-set before acting on any signal, so exactly one terminal
//! outcome is produced and late arrivals are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::common::Route;
use crate::domains::auth::models::RegistrationStatus;
use crate::kernel::store::{AuthChangeEvent, SessionStore};

/// Failure text for a sign-out / dead-link signal.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Your link may have expired.";
/// Failure text when the profile fetch behind a live session fails.
pub const PROFILE_LOAD_MESSAGE: &str = "Unable to load your profile. Please try again.";

/// The callback URL's embedded parameters, query and fragment both, since
/// identity providers report link errors in either. Injected so resolution
/// is testable without a real location.
#[derive(Debug, Clone, Default)]
pub struct CallbackLocation {
    params: Vec<(String, String)>,
}

impl CallbackLocation {
    /// Parse the full callback URL. An unparseable URL reads as empty.
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::default();
        };
        let mut params: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if let Some(fragment) = parsed.fragment() {
            params.extend(
                url::form_urlencoded::parse(fragment.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned())),
            );
        }
        Self { params }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn has(&self, key: &str, value: &str) -> bool {
        self.params.iter().any(|(k, v)| k == key && v == value)
    }

    /// True when the provider flagged the link as denied or expired.
    pub fn has_expired_link_markers(&self) -> bool {
        self.has("error", "access_denied") || self.has("error_code", "otp_expired")
    }
}

/// The single terminal result of a callback resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Send the user on: dashboard, registration, or the link-expired page.
    Navigate(Route),
    /// Terminal error display state. No navigation; the host offers a
    /// manual path back to sign-in.
    Error(String),
}

/// Reconciles the subscription and the one-shot query into one outcome.
///
/// The stepwise methods ([`handle_event`](Self::handle_event),
/// [`check_existing_session`](Self::check_existing_session)) let tests drive
/// any interleaving; [`resolve`](Self::resolve) drives both signals
/// concurrently for production use.
pub struct CallbackResolver<S> {
    store: Arc<S>,
    location: CallbackLocation,
    resolved: AtomicBool,
}

impl<S: SessionStore> CallbackResolver<S> {
    pub fn new(store: Arc<S>, location: CallbackLocation) -> Self {
        Self {
            store,
            location,
            resolved: AtomicBool::new(false),
        }
    }

    /// Whether a terminal outcome has been produced.
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    /// First-resolution-wins: true exactly once.
    fn try_begin(&self) -> bool {
        !self.resolved.swap(true, Ordering::SeqCst)
    }

    /// Feed one subscription event. Returns the terminal outcome if this
    /// event decided the resolution, `None` if it was ignored.
    ///
    /// A null initial snapshot is *not* a failure: the one-shot query may
    /// still be in flight, and flashing "authentication failed" here would
    /// be wrong.
    pub async fn handle_event(&self, event: AuthChangeEvent) -> Option<CallbackOutcome> {
        match event {
            AuthChangeEvent::SignedIn(_) | AuthChangeEvent::TokenRefreshed(_) => {
                if !self.try_begin() {
                    return None;
                }
                Some(self.profile_destination().await)
            }
            AuthChangeEvent::SignedOut => {
                if !self.try_begin() {
                    return None;
                }
                Some(self.classify_failure(AUTH_FAILED_MESSAGE))
            }
            AuthChangeEvent::InitialSession(_) => None,
        }
    }

    /// The one-shot pull: query the session directly. A live session
    /// resolves through the profile; no session plus provider error markers
    /// resolves straight to link-expired; no session otherwise defers to the
    /// subscription, as does a failed query.
    pub async fn check_existing_session(&self) -> Option<CallbackOutcome> {
        if self.is_resolved() {
            return None;
        }
        match self.store.get_session().await {
            Ok(Some(_)) => {
                if !self.try_begin() {
                    return None;
                }
                Some(self.profile_destination().await)
            }
            Ok(None) => {
                if self.location.has_expired_link_markers() {
                    if !self.try_begin() {
                        return None;
                    }
                    info!("expired link markers on callback URL");
                    Some(CallbackOutcome::Navigate(Route::LinkExpired))
                } else {
                    None
                }
            }
            Err(err) => {
                // The subscription path owns failure handling
                debug!(error = %err, "session query failed, awaiting subscription");
                None
            }
        }
    }

    /// Drive both signals until one resolves. The subscription is created
    /// here and released when this future completes or is dropped. If the
    /// event stream closes with nothing resolved, the resolution degrades to
    /// the failure classification rather than hanging.
    pub async fn resolve(&self) -> CallbackOutcome {
        let mut subscription = self.store.on_auth_state_change().await;
        let mut query = Box::pin(self.check_existing_session());
        let mut query_done = false;
        let mut stream_open = true;

        loop {
            tokio::select! {
                outcome = &mut query, if !query_done => {
                    query_done = true;
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                }
                event = subscription.recv(), if stream_open => {
                    match event {
                        Some(event) => {
                            if let Some(outcome) = self.handle_event(event).await {
                                return outcome;
                            }
                        }
                        None => stream_open = false,
                    }
                }
                else => {
                    // Both signal sources exhausted without a decision
                    self.try_begin();
                    return self.classify_failure(AUTH_FAILED_MESSAGE);
                }
            }
        }
    }

    /// Step 4: the session is known good; route on profile completeness.
    async fn profile_destination(&self) -> CallbackOutcome {
        match self.store.get_profile().await {
            Err(err) => {
                debug!(error = %err, "profile fetch failed during callback");
                self.classify_failure(PROFILE_LOAD_MESSAGE)
            }
            Ok(profile) => match RegistrationStatus::from_profile(profile) {
                RegistrationStatus::Registered(_) => CallbackOutcome::Navigate(Route::Dashboard),
                RegistrationStatus::Unregistered(_) => CallbackOutcome::Navigate(Route::Register),
            },
        }
    }

    /// Step 5: an expired link is a dedicated destination, recognized
    /// structurally (URL markers) or textually (the message says so). Only
    /// what remains becomes a visible error state.
    fn classify_failure(&self, message: &str) -> CallbackOutcome {
        if self.location.has_expired_link_markers()
            || message.to_lowercase().contains("expired")
        {
            CallbackOutcome::Navigate(Route::LinkExpired)
        } else {
            CallbackOutcome::Error(message.to_string())
        }
    }
}
