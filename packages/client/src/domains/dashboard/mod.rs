//! Dashboard domain: growth-by-month rows behind the registration guard.

pub mod models;
pub mod rows;

pub use models::GrowthData;
pub use rows::{
    build_rows, format_pct, sort_rows, toggle_sort, DashboardRow, SortColumn, SortDirection,
    MONTHS,
};

use crate::common::StoreError;
use crate::domains::auth::models::Profile;
use crate::kernel::store::SessionStore;
use crate::kernel::supabase::SupabaseStore;

/// Everything the dashboard screen needs, fetched concurrently.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// The viewer's own profile (drives the admin affordances).
    pub profile: Option<Profile>,
    pub profiles: Vec<Profile>,
    pub growth_data: Vec<GrowthData>,
}

/// Fetch the viewer's profile, all member profiles, and one year of growth
/// rows in parallel.
pub async fn load_dashboard(
    store: &SupabaseStore,
    year: i32,
) -> Result<DashboardData, StoreError> {
    let (profile, profiles, growth_data) = tokio::try_join!(
        store.get_profile(),
        store.get_all_profiles(),
        store.get_growth_data_for_year(year),
    )?;
    Ok(DashboardData {
        profile,
        profiles,
        growth_data,
    })
}
