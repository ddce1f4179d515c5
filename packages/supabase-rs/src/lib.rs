//! Minimal Supabase client: GoTrue passwordless auth plus PostgREST rows.
//!
//! Covers exactly the surface the client application consumes: OTP request
//! and verification, token refresh, logout, and typed row access. Row types
//! are supplied by the caller; this crate stays application-agnostic.

pub mod models;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{ErrorBody, TokenResponse, User};

/// PostgREST code for "zero rows returned when one was requested".
const PGRST_NO_ROWS: &str = "PGRST116";

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. The message is the provider's own text, preserved
    /// verbatim; callers classify failures (e.g. expired links) from it.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Anonymous (publishable) API key.
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    options: SupabaseOptions,
    http: Client,
}

impl SupabaseClient {
    pub fn new(options: SupabaseOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.options.url.trim_end_matches('/'), path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1{}", self.options.url.trim_end_matches('/'), path)
    }

    fn headers(&self, access_token: Option<&str>) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        let bearer = access_token.unwrap_or(&self.options.anon_key);
        if let Ok(value) = self.options.anon_key.parse() {
            headers.insert("apikey", value);
        }
        if let Ok(value) = format!("Bearer {bearer}").parse() {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    async fn check(&self, response: Response) -> Result<Response, SupabaseError> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(api_error(response).await)
    }

    // =========================================================================
    // GoTrue
    // =========================================================================

    /// Request a magic-link / email OTP. `redirect_to` is the URL the link
    /// returns the user to after the provider completes sign-in.
    pub async fn request_email_otp(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http
            .post(self.auth_url("/otp"))
            .headers(self.headers(None))
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "email": email, "create_user": true }))
            .send()
            .await?;
        self.check(response).await.map(|_| ())
    }

    /// Request an SMS OTP.
    pub async fn request_sms_otp(&self, phone: &str) -> Result<(), SupabaseError> {
        let response = self
            .http
            .post(self.auth_url("/otp"))
            .headers(self.headers(None))
            .json(&serde_json::json!({ "phone": phone, "create_user": true }))
            .send()
            .await?;
        self.check(response).await.map(|_| ())
    }

    /// Exchange an emailed code for a session.
    pub async fn verify_email_otp(
        &self,
        email: &str,
        token: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        self.verify(serde_json::json!({
            "type": "magiclink",
            "email": email,
            "token": token,
        }))
        .await
    }

    /// Exchange an SMS code for a session.
    pub async fn verify_sms_otp(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        self.verify(serde_json::json!({
            "type": "sms",
            "phone": phone,
            "token": token,
        }))
        .await
    }

    async fn verify(&self, body: Value) -> Result<TokenResponse, SupabaseError> {
        let response = self
            .http
            .post(self.auth_url("/verify"))
            .headers(self.headers(None))
            .json(&body)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Trade a refresh token for a fresh session.
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        let response = self
            .http
            .post(self.auth_url("/token"))
            .headers(self.headers(None))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Revoke the session server-side.
    pub async fn logout(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .http
            .post(self.auth_url("/logout"))
            .headers(self.headers(Some(access_token)))
            .send()
            .await?;
        // GoTrue returns 204; a 401 here means the token is already dead.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        self.check(response).await.map(|_| ())
    }

    /// Fetch the user behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<User, SupabaseError> {
        let response = self
            .http
            .get(self.auth_url("/user"))
            .headers(self.headers(Some(access_token)))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    // =========================================================================
    // PostgREST
    // =========================================================================

    /// Select rows. `query` carries PostgREST filter/order pairs, e.g.
    /// `[("select", "*"), ("year", "eq.2024"), ("order", "month.asc")]`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        access_token: Option<&str>,
    ) -> Result<Vec<T>, SupabaseError> {
        let response = self
            .http
            .get(self.rest_url(&format!("/{table}")))
            .headers(self.headers(access_token))
            .query(query)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Select exactly one row; `Ok(None)` when the row does not exist
    /// (PostgREST reports zero rows as `PGRST116`, which is not an error
    /// condition for callers).
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        access_token: Option<&str>,
    ) -> Result<Option<T>, SupabaseError> {
        let response = self
            .http
            .get(self.rest_url(&format!("/{table}")))
            .headers(self.headers(access_token))
            .header(header::ACCEPT, "application/vnd.pgrst.object+json")
            .query(query)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(Some(response.json().await?));
        }
        let err = api_error(response).await;
        if let SupabaseError::Api { code: Some(code), .. } = &err {
            if code == PGRST_NO_ROWS {
                return Ok(None);
            }
        }
        Err(err)
    }

    /// Insert a row.
    pub async fn insert(
        &self,
        table: &str,
        body: Value,
        access_token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http
            .post(self.rest_url(&format!("/{table}")))
            .headers(self.headers(access_token))
            .json(&body)
            .send()
            .await?;
        self.check(response).await.map(|_| ())
    }

    /// Update rows matched by `query` filters.
    pub async fn update(
        &self,
        table: &str,
        query: &[(&str, &str)],
        body: Value,
        access_token: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http
            .patch(self.rest_url(&format!("/{table}")))
            .headers(self.headers(access_token))
            .query(query)
            .json(&body)
            .send()
            .await?;
        self.check(response).await.map(|_| ())
    }

    /// Call a database function and deserialize its scalar/row result.
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: Value,
        access_token: Option<&str>,
    ) -> Result<T, SupabaseError> {
        let response = self
            .http
            .post(self.rest_url(&format!("/rpc/{function}")))
            .headers(self.headers(access_token))
            .json(&args)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }
}

async fn api_error(response: Response) -> SupabaseError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => SupabaseError::Api {
            status,
            code: body.code_str(),
            message: body
                .message()
                .unwrap_or("request rejected by Supabase")
                .to_string(),
        },
        Err(_) => SupabaseError::Api {
            status,
            code: None,
            message: format!("request failed with status {status}"),
        },
    }
}
