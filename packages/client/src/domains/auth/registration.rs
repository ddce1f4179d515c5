//! Invitation-gated registration completion.
//!
//! Reached after sign-in with an incomplete profile. Loads the session and
//! any existing profile to prefill the form, then submits the normalized
//! registration data. An invalid invitation code is a recognized failure
//! with a fixed, user-safe message; raw provider text is never shown for
//! that case.

use std::sync::Arc;

use tracing::warn;

use crate::common::{Route, StoreError};
use crate::domains::auth::identifier::{is_valid_phone, normalize_email, normalize_to_e164};
use crate::domains::auth::login::PHONE_FORMAT_ERROR;
use crate::domains::auth::models::{Profile, RegistrationData};
use crate::kernel::store::SessionStore;

pub const INVITATION_CODE_ERROR: &str =
    "Invalid invitation code. Please contact the administrator.";
pub const REGISTRATION_FAILED_ERROR: &str = "Registration failed. Please try again.";
const PROFILE_LOAD_ERROR: &str = "Unable to load your profile. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Loading,
    Ready,
    Submitting,
    Error,
}

/// Raw form input, as typed.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub invitation_code: String,
}

pub struct RegistrationFlow<S> {
    store: Arc<S>,
    state: RegistrationState,
    error_message: Option<String>,
    phone_error: Option<String>,
    prefill: RegistrationForm,
    existing_profile: Option<Profile>,
}

impl<S: SessionStore> RegistrationFlow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: RegistrationState::Loading,
            error_message: None,
            phone_error: None,
            prefill: RegistrationForm::default(),
            existing_profile: None,
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn phone_error(&self) -> Option<&str> {
        self.phone_error.as_deref()
    }

    /// Form values to prefill once `Ready`.
    pub fn prefill(&self) -> &RegistrationForm {
        &self.prefill
    }

    /// Load session and profile, prefill the form. Returns a redirect for
    /// the host to perform when there is no session to register against.
    pub async fn load(&mut self) -> Option<Route> {
        self.state = RegistrationState::Loading;
        let session = match self.store.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return Some(Route::Login),
            Err(err) => {
                warn!(error = %err, "session fetch failed loading registration");
                self.fail(PROFILE_LOAD_ERROR.to_string());
                return None;
            }
        };

        match self.store.get_profile().await {
            Ok(profile) => {
                self.existing_profile = profile;
                self.prefill = match &self.existing_profile {
                    Some(profile) => RegistrationForm {
                        first_name: profile.first_name.clone().unwrap_or_default(),
                        last_name: profile.last_name.clone().unwrap_or_default(),
                        email: profile
                            .email
                            .clone()
                            .or_else(|| session.user.email.clone())
                            .unwrap_or_default(),
                        phone: profile
                            .phone
                            .clone()
                            .or_else(|| session.user.phone.clone())
                            .unwrap_or_default(),
                        invitation_code: String::new(),
                    },
                    // New user: only the identifier they authenticated with
                    None => RegistrationForm {
                        email: session.user.email.clone().unwrap_or_default(),
                        phone: session.user.phone.clone().unwrap_or_default(),
                        ..RegistrationForm::default()
                    },
                };
                self.state = RegistrationState::Ready;
                None
            }
            Err(err) => {
                warn!(error = %err, "profile fetch failed loading registration");
                self.fail(PROFILE_LOAD_ERROR.to_string());
                None
            }
        }
    }

    /// Field-blur validation for the phone input.
    pub fn validate_phone(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() || is_valid_phone(raw) {
            self.phone_error = None;
        } else {
            self.phone_error = Some(PHONE_FORMAT_ERROR.to_string());
        }
    }

    /// Normalize and submit the form. Returns the destination to navigate
    /// to on success. A phone that does not normalize never reaches the
    /// store.
    pub async fn submit(&mut self, form: &RegistrationForm) -> Option<Route> {
        let Some(e164) = normalize_to_e164(&form.phone) else {
            self.phone_error = Some(PHONE_FORMAT_ERROR.to_string());
            return None;
        };
        self.phone_error = None;
        self.error_message = None;
        self.state = RegistrationState::Submitting;

        let data = RegistrationData {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: normalize_email(&form.email),
            phone: e164,
            invitation_code: form.invitation_code.trim().to_string(),
        };

        match self.store.complete_registration(&data).await {
            Ok(true) => {
                self.state = RegistrationState::Ready;
                Some(Route::Dashboard)
            }
            Ok(false) => {
                self.fail(REGISTRATION_FAILED_ERROR.to_string());
                None
            }
            Err(StoreError::InvitationCode) => {
                self.fail(INVITATION_CODE_ERROR.to_string());
                None
            }
            Err(err) => {
                warn!(error = %err, "registration submission failed");
                let message = err.to_string();
                self.fail(if message.is_empty() {
                    REGISTRATION_FAILED_ERROR.to_string()
                } else {
                    message
                });
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.error_message = Some(message);
        self.state = RegistrationState::Error;
    }
}
