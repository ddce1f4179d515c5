use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One month of growth for one member, keyed by their email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthData {
    pub id: Uuid,
    pub email_key: String,
    pub bank_name: String,
    pub is_managed: bool,
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub growth_pct: f64,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
