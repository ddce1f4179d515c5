//! Auth domain data types.
//!
//! `Session` is the server-issued proof of authentication; `Profile` is the
//! application-level record behind it. The two are fetched independently and
//! never assumed to form a consistent joint snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity attributes embedded in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Opaque proof of authentication. Created by the store on successful OTP
/// verification, destroyed on sign-out or token expiry; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub access_token: String,
}

/// Application profile row, one-to-one with a user identity.
///
/// Names are optional until registration completes. A missing row is a valid
/// state ("not yet registered"), distinct from a retrieval failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub registration_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Registration invariant: a complete profile carries both names.
    pub fn is_complete(&self) -> bool {
        self.registration_complete
    }
}

/// Semantic view of a profile fetch. "Not registered yet" collapses the
/// missing row and the not-yet-completed row, which guards and the callback
/// resolver treat identically; the underlying row is kept for diagnostics
/// and form prefill.
#[derive(Debug, Clone)]
pub enum RegistrationStatus {
    Unregistered(Option<Profile>),
    Registered(Profile),
}

impl RegistrationStatus {
    pub fn from_profile(profile: Option<Profile>) -> Self {
        match profile {
            Some(profile) if profile.is_complete() => RegistrationStatus::Registered(profile),
            other => RegistrationStatus::Unregistered(other),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RegistrationStatus::Registered(_))
    }
}

/// Input to `complete_registration`. All fields already normalized by the
/// registration flow (trimmed names/code, lowercased email, E.164 phone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub invitation_code: String,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
