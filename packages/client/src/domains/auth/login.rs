//! Passwordless sign-in flow.
//!
//! One free-text field accepts an email address or a phone number. The flow
//! classifies the identifier, normalizes it, and dispatches the matching
//! sign-in operation, at most once per submission. It never navigates; its
//! only side effect is requesting the out-of-band link/code.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domains::auth::identifier::{
    is_email, is_valid_phone, normalize_email, normalize_to_e164,
};
use crate::kernel::store::SessionStore;

/// Shown when the identifier is neither an email nor a parseable phone
/// number. A local validation outcome, not a fatal error.
pub const PHONE_FORMAT_ERROR: &str = "Invalid phone number. Please enter a valid phone number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    /// The link/code went out; `sent_to` holds the normalized destination.
    Sent,
    /// The sign-in dispatch failed; `error_message` holds the provider text.
    Error,
}

/// Sign-in state machine. `Sent` and `Error` return to `Idle` only through
/// an explicit [`reset`](Self::reset). `&mut self` on
/// [`submit`](Self::submit) makes concurrent submission unrepresentable;
/// ignoring re-submission while `Submitting` is the caller's concern.
pub struct LoginFlow<S> {
    store: Arc<S>,
    state: LoginState,
    error_message: Option<String>,
    phone_error: Option<String>,
    sent_to: Option<String>,
}

impl<S: SessionStore> LoginFlow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: LoginState::Idle,
            error_message: None,
            phone_error: None,
            sent_to: None,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn phone_error(&self) -> Option<&str> {
        self.phone_error.as_deref()
    }

    /// Normalized destination the link/code was sent to, once `Sent`.
    pub fn sent_to(&self) -> Option<&str> {
        self.sent_to.as_deref()
    }

    /// Field-blur validation: flags an identifier that is neither an email
    /// nor a valid phone number. Blank input clears the flag.
    pub fn validate_identifier(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() || is_email(raw) || is_valid_phone(raw) {
            self.phone_error = None;
        } else {
            self.phone_error = Some(PHONE_FORMAT_ERROR.to_string());
        }
    }

    /// Classify, normalize and dispatch. Blank input is a no-op (the form's
    /// required-field validation owns that case).
    pub async fn submit(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }

        self.phone_error = None;
        self.error_message = None;
        self.state = LoginState::Submitting;

        if is_email(raw) {
            let email = normalize_email(raw);
            match self.store.sign_in_with_email(&email).await {
                Ok(()) => {
                    info!("sign-in link dispatched");
                    self.sent_to = Some(email);
                    self.state = LoginState::Sent;
                }
                Err(err) => {
                    warn!(error = %err, "email sign-in failed");
                    self.error_message = Some(err.to_string());
                    self.state = LoginState::Error;
                }
            }
            return;
        }

        let Some(e164) = normalize_to_e164(raw) else {
            // Retryable in place: back to Idle, not Error
            self.phone_error = Some(PHONE_FORMAT_ERROR.to_string());
            self.state = LoginState::Idle;
            return;
        };

        match self.store.sign_in_with_phone(&e164).await {
            Ok(()) => {
                info!("sign-in code dispatched");
                self.sent_to = Some(e164);
                self.state = LoginState::Sent;
            }
            Err(err) => {
                warn!(error = %err, "phone sign-in failed");
                self.error_message = Some(err.to_string());
                self.state = LoginState::Error;
            }
        }
    }

    /// Explicit return to `Idle`, clearing messages and the sent
    /// destination.
    pub fn reset(&mut self) {
        self.state = LoginState::Idle;
        self.error_message = None;
        self.phone_error = None;
        self.sent_to = None;
    }
}
