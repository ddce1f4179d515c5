//! Route surface shared by guards and the callback resolver.

use std::fmt;

/// All application destinations the auth core can send the user to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    AuthCallback,
    LinkExpired,
    AdminProfiles,
    AdminMarketData,
    AdminHistoricalData,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::AuthCallback => "/auth/callback",
            Route::LinkExpired => "/auth/link-expired",
            Route::AdminProfiles => "/admin/profiles",
            Route::AdminMarketData => "/admin/market-data",
            Route::AdminHistoricalData => "/admin/historical-data",
        }
    }

    /// True for destinations under the admin subtree.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Route::AdminProfiles | Route::AdminMarketData | Route::AdminHistoricalData
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of evaluating a guard for a navigation attempt. Each evaluation
/// yields exactly one decision; decisions are never merged or retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested destination.
    Allow,
    /// Send the user elsewhere instead.
    RedirectTo(Route),
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationDecision::Allow)
    }
}
