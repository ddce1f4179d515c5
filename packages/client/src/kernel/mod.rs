pub mod store;
pub mod supabase;

pub use store::{AuthChangeEvent, AuthSubscription, SessionStore};
pub use supabase::SupabaseStore;
