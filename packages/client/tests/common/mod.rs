//! Shared test harness: a scriptable in-memory session store and canned
//! fixtures.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use client_core::common::StoreError;
use client_core::domains::auth::models::{
    Profile, ProfileChanges, RegistrationData, Session, SessionUser,
};
use client_core::kernel::store::{AuthChangeEvent, AuthSubscription, SessionStore};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Fixtures
// ============================================================================

pub const MOCK_USER_ID: &str = "9b7cd18d-6b48-4aa5-b2a1-6b0c2f3a1111";

pub fn mock_session() -> Session {
    Session {
        user: SessionUser {
            id: Uuid::parse_str(MOCK_USER_ID).unwrap(),
            email: Some("john@example.com".to_string()),
            phone: Some("+12125551234".to_string()),
        },
        access_token: "mock-token".to_string(),
    }
}

pub fn profile_complete() -> Profile {
    Profile {
        id: Uuid::parse_str(MOCK_USER_ID).unwrap(),
        first_name: Some("John".to_string()),
        last_name: Some("Doe".to_string()),
        email: Some("john@example.com".to_string()),
        phone: Some("+12125551234".to_string()),
        is_admin: false,
        email_verified: true,
        phone_verified: false,
        registration_complete: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn profile_incomplete() -> Profile {
    Profile {
        first_name: None,
        last_name: None,
        registration_complete: false,
        ..profile_complete()
    }
}

pub fn profile_admin() -> Profile {
    Profile {
        is_admin: true,
        ..profile_complete()
    }
}

// ============================================================================
// Scriptable store
// ============================================================================

/// Cloneable stand-in for a scripted failure; converted to [`StoreError`]
/// when the call is made.
#[derive(Debug, Clone)]
pub enum Failure {
    Transport(String),
    Provider(String),
    InvitationCode,
}

impl From<Failure> for StoreError {
    fn from(f: Failure) -> Self {
        match f {
            Failure::Transport(m) => StoreError::Transport(m),
            Failure::Provider(m) => StoreError::Provider(m),
            Failure::InvitationCode => StoreError::InvitationCode,
        }
    }
}

/// In-memory [`SessionStore`] with per-operation scripted results, recorded
/// calls, and a broadcast sender for driving auth events from tests.
pub struct MockStore {
    pub session: Mutex<Result<Option<Session>, Failure>>,
    pub profile: Mutex<Result<Option<Profile>, Failure>>,
    pub email_result: Mutex<Result<(), Failure>>,
    pub phone_result: Mutex<Result<(), Failure>>,
    pub registration_result: Mutex<Result<bool, Failure>>,

    pub email_sign_ins: Mutex<Vec<String>>,
    pub phone_sign_ins: Mutex<Vec<String>>,
    pub registrations: Mutex<Vec<RegistrationData>>,
    pub session_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub sign_outs: AtomicUsize,

    events: broadcast::Sender<AuthChangeEvent>,
}

impl MockStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            session: Mutex::new(Ok(None)),
            profile: Mutex::new(Ok(None)),
            email_result: Mutex::new(Ok(())),
            phone_result: Mutex::new(Ok(())),
            registration_result: Mutex::new(Ok(true)),
            email_sign_ins: Mutex::new(Vec::new()),
            phone_sign_ins: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            session_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
            events,
        }
    }

    /// Store with a live session and the given profile.
    pub fn signed_in(profile: Option<Profile>) -> Self {
        let store = Self::new();
        *store.session.lock().unwrap() = Ok(Some(mock_session()));
        *store.profile.lock().unwrap() = Ok(profile);
        store
    }

    /// Push an auth event to current subscribers.
    pub fn emit(&self, event: AuthChangeEvent) {
        let _ = self.events.send(event);
    }

    /// Number of live subscriptions; tests use this to sequence an emit
    /// strictly after a resolver has subscribed.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MockStore {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        self.session.lock().unwrap().clone().map_err(Into::into)
    }

    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        // Null session means null profile, not an error
        if matches!(&*self.session.lock().unwrap(), Ok(None)) {
            return Ok(None);
        }
        self.profile.lock().unwrap().clone().map_err(Into::into)
    }

    async fn sign_in_with_email(&self, email: &str) -> Result<(), StoreError> {
        self.email_sign_ins.lock().unwrap().push(email.to_string());
        self.email_result.lock().unwrap().clone().map_err(Into::into)
    }

    async fn sign_in_with_phone(&self, phone: &str) -> Result<(), StoreError> {
        self.phone_sign_ins.lock().unwrap().push(phone.to_string());
        self.phone_result.lock().unwrap().clone().map_err(Into::into)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Ok(None);
        self.emit(AuthChangeEvent::SignedOut);
        Ok(())
    }

    async fn on_auth_state_change(&self) -> AuthSubscription {
        let current = self.session.lock().unwrap().clone().unwrap_or(None);
        AuthSubscription::new(
            Some(AuthChangeEvent::InitialSession(current)),
            self.events.subscribe(),
        )
    }

    async fn complete_registration(&self, data: &RegistrationData) -> Result<bool, StoreError> {
        self.registrations.lock().unwrap().push(data.clone());
        self.registration_result
            .lock()
            .unwrap()
            .clone()
            .map_err(Into::into)
    }

    async fn update_profile(&self, _changes: &ProfileChanges) -> Result<(), StoreError> {
        if matches!(&*self.session.lock().unwrap(), Ok(None)) {
            return Err(StoreError::NotAuthenticated);
        }
        Ok(())
    }
}
