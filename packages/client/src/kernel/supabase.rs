//! Production [`SessionStore`] over the Supabase REST surface.
//!
//! Holds the current session in memory and fans auth state changes out to
//! subscribers. Token expiry is observed at read time: an expired session
//! reads as absent, never as an error.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use async_trait::async_trait;
use supabase::models::TokenResponse;
use supabase::SupabaseClient;

use crate::common::StoreError;
use crate::domains::auth::models::{
    Profile, ProfileChanges, RegistrationData, Session, SessionUser,
};
use crate::domains::dashboard::models::GrowthData;
use crate::kernel::store::{AuthChangeEvent, AuthSubscription, SessionStore};

const EVENT_CAPACITY: usize = 16;

struct StoredSession {
    session: Session,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Session store backed by GoTrue (auth) and PostgREST (rows).
pub struct SupabaseStore {
    client: SupabaseClient,
    /// Fixed callback-return address embedded in magic-link emails.
    auth_callback_url: String,
    state: Arc<RwLock<Option<StoredSession>>>,
    events: broadcast::Sender<AuthChangeEvent>,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient, auth_callback_url: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            auth_callback_url,
            state: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Exchange an emailed OTP code for a session. Emits `SignedIn`.
    pub async fn verify_email_otp(&self, email: &str, code: &str) -> Result<Session, StoreError> {
        let token = self.client.verify_email_otp(email, code).await?;
        Ok(self.install(token, false).await)
    }

    /// Exchange an SMS OTP code for a session. Emits `SignedIn`.
    pub async fn verify_sms_otp(&self, phone: &str, code: &str) -> Result<Session, StoreError> {
        let token = self.client.verify_sms_otp(phone, code).await?;
        Ok(self.install(token, false).await)
    }

    /// Renew the current session with its refresh token. Emits
    /// `TokenRefreshed`.
    pub async fn refresh_session(&self) -> Result<Session, StoreError> {
        let refresh_token = {
            let state = self.state.read().await;
            match state.as_ref() {
                Some(stored) => stored.refresh_token.clone(),
                None => return Err(StoreError::NotAuthenticated),
            }
        };
        let token = self.client.refresh_session(&refresh_token).await?;
        Ok(self.install(token, true).await)
    }

    async fn install(&self, token: TokenResponse, refreshed: bool) -> Session {
        let session = Session {
            user: SessionUser {
                id: token.user.id,
                email: token.user.email.clone(),
                phone: token.user.phone.clone(),
            },
            access_token: token.access_token.clone(),
        };
        {
            let mut state = self.state.write().await;
            *state = Some(StoredSession {
                session: session.clone(),
                refresh_token: token.refresh_token,
                expires_at: Utc::now() + Duration::seconds(token.expires_in),
            });
        }
        info!(user = %session.user.id, refreshed, "session installed");
        let event = if refreshed {
            AuthChangeEvent::TokenRefreshed(session.clone())
        } else {
            AuthChangeEvent::SignedIn(session.clone())
        };
        // No subscribers is fine
        let _ = self.events.send(event);
        session
    }

    async fn current(&self) -> Option<Session> {
        let state = self.state.read().await;
        let stored = state.as_ref()?;
        if Utc::now() >= stored.expires_at {
            return None;
        }
        Some(stored.session.clone())
    }

    // =========================================================================
    // Dashboard data
    // =========================================================================

    /// All member profiles, newest first.
    pub async fn get_all_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let session = self.current().await;
        let token = session.as_ref().map(|s| s.access_token.as_str());
        Ok(self
            .client
            .select(
                "profiles",
                &[("select", "*"), ("order", "created_at.desc")],
                token,
            )
            .await?)
    }

    /// Growth rows for one calendar year, ordered by month.
    pub async fn get_growth_data_for_year(&self, year: i32) -> Result<Vec<GrowthData>, StoreError> {
        let session = self.current().await;
        let token = session.as_ref().map(|s| s.access_token.as_str());
        let year_filter = format!("eq.{year}");
        Ok(self
            .client
            .select(
                "growth_data",
                &[
                    ("select", "*"),
                    ("year", year_filter.as_str()),
                    ("order", "month.asc"),
                ],
                token,
            )
            .await?)
    }
}

#[async_trait]
impl SessionStore for SupabaseStore {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.current().await)
    }

    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        let Some(session) = self.current().await else {
            return Ok(None);
        };
        let id_filter = format!("eq.{}", session.user.id);
        Ok(self
            .client
            .select_single(
                "profiles",
                &[("select", "*"), ("id", id_filter.as_str())],
                Some(&session.access_token),
            )
            .await?)
    }

    async fn sign_in_with_email(&self, email: &str) -> Result<(), StoreError> {
        self.client
            .request_email_otp(email, &self.auth_callback_url)
            .await?;
        info!("sign-in link requested for email");
        Ok(())
    }

    async fn sign_in_with_phone(&self, phone: &str) -> Result<(), StoreError> {
        self.client.request_sms_otp(phone).await?;
        info!("sign-in code requested for phone");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        let session = self.current().await;
        if let Some(session) = session {
            self.client.logout(&session.access_token).await?;
        }
        {
            let mut state = self.state.write().await;
            *state = None;
        }
        let _ = self.events.send(AuthChangeEvent::SignedOut);
        Ok(())
    }

    async fn on_auth_state_change(&self) -> AuthSubscription {
        let rx = self.events.subscribe();
        let initial = AuthChangeEvent::InitialSession(self.current().await);
        AuthSubscription::new(Some(initial), rx)
    }

    async fn complete_registration(&self, data: &RegistrationData) -> Result<bool, StoreError> {
        let session = self.current().await;
        let token = session.as_ref().map(|s| s.access_token.as_str());
        let accepted: bool = self
            .client
            .rpc(
                "complete_registration",
                serde_json::json!({
                    "p_first_name": data.first_name,
                    "p_last_name": data.last_name,
                    "p_phone": data.phone,
                    "p_email": data.email,
                    "p_invitation_code": data.invitation_code,
                }),
                token,
            )
            .await?;
        if !accepted {
            warn!("registration refused by store");
        }
        Ok(accepted)
    }

    async fn update_profile(&self, changes: &ProfileChanges) -> Result<(), StoreError> {
        let Some(session) = self.current().await else {
            return Err(StoreError::NotAuthenticated);
        };
        let id_filter = format!("eq.{}", session.user.id);
        let body = serde_json::to_value(changes)
            .map_err(|e| StoreError::Provider(format!("unserializable profile update: {e}")))?;
        self.client
            .update(
                "profiles",
                &[("id", id_filter.as_str())],
                body,
                Some(&session.access_token),
            )
            .await?;
        Ok(())
    }
}
