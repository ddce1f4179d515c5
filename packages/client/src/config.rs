use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Origin the magic-link callback returns to.
    pub app_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY must be set")?,
            app_origin: env::var("APP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
        })
    }

    /// Redirect URL embedded in magic-link emails.
    pub fn auth_callback_url(&self) -> String {
        format!("{}/auth/callback", self.app_origin.trim_end_matches('/'))
    }
}
