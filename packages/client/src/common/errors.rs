use thiserror::Error;

/// Failures surfaced by the session store and its flows.
///
/// Guards never map these to redirects: absence of a session or profile is
/// control flow, while a failed fetch is an error and propagates.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not reach the store at all.
    #[error("network error: {0}")]
    Transport(String),

    /// The store answered with a rejection. The message is the provider's
    /// own text; callers that classify failures (expired links, invitation
    /// codes) depend on it being preserved.
    #[error("{0}")]
    Provider(String),

    /// `complete_registration` rejected the invitation code.
    #[error("invalid invitation code")]
    InvitationCode,

    /// Operation requires a signed-in user and there is none. Raised before
    /// any network call is made.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl From<supabase::SupabaseError> for StoreError {
    fn from(err: supabase::SupabaseError) -> Self {
        match err {
            supabase::SupabaseError::Http(e) => StoreError::Transport(e.to_string()),
            supabase::SupabaseError::Api { message, .. } => {
                if message.to_lowercase().contains("invitation code") {
                    StoreError::InvitationCode
                } else {
                    StoreError::Provider(message)
                }
            }
        }
    }
}
