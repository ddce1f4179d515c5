//! Route guards.
//!
//! Each guard is an independent decision function: it makes its own fresh
//! store reads and converts *absence* (no session, incomplete registration,
//! not an admin) into a redirect. Fetch failures are never treated as
//! absence; they propagate to the caller's navigation error handling.
//!
//! The session check always runs first: an unauthenticated user must land on
//! the login screen, never on a registration- or admin-specific redirect.

use crate::common::{NavigationDecision, Route, StoreError};
use crate::domains::auth::models::RegistrationStatus;
use crate::kernel::store::SessionStore;

/// Requires any authenticated session. Attached to `/register`.
pub async fn require_session<S: SessionStore>(
    store: &S,
) -> Result<NavigationDecision, StoreError> {
    if store.get_session().await?.is_none() {
        return Ok(NavigationDecision::RedirectTo(Route::Login));
    }
    Ok(NavigationDecision::Allow)
}

/// Requires a session whose profile has completed registration. Attached to
/// `/dashboard`.
pub async fn require_completed_registration<S: SessionStore>(
    store: &S,
) -> Result<NavigationDecision, StoreError> {
    if store.get_session().await?.is_none() {
        return Ok(NavigationDecision::RedirectTo(Route::Login));
    }
    match RegistrationStatus::from_profile(store.get_profile().await?) {
        RegistrationStatus::Registered(_) => Ok(NavigationDecision::Allow),
        RegistrationStatus::Unregistered(_) => {
            Ok(NavigationDecision::RedirectTo(Route::Register))
        }
    }
}

/// Requires an admin profile. Attached to the `/admin` subtree. A signed-in
/// non-admin is sent to the dashboard, not back through login.
pub async fn require_admin<S: SessionStore>(store: &S) -> Result<NavigationDecision, StoreError> {
    if store.get_session().await?.is_none() {
        return Ok(NavigationDecision::RedirectTo(Route::Login));
    }
    if !store.is_admin().await? {
        return Ok(NavigationDecision::RedirectTo(Route::Dashboard));
    }
    Ok(NavigationDecision::Allow)
}

/// Guard attachment per destination: `/register` needs a session,
/// `/dashboard` needs completed registration, the admin subtree needs an
/// admin. Everything else is open.
pub async fn decide_for_route<S: SessionStore>(
    store: &S,
    route: Route,
) -> Result<NavigationDecision, StoreError> {
    match route {
        Route::Register => require_session(store).await,
        Route::Dashboard => require_completed_registration(store).await,
        route if route.is_admin() => require_admin(store).await,
        _ => Ok(NavigationDecision::Allow),
    }
}
