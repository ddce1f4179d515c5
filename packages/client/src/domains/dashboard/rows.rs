//! Dashboard table: member rows by month, with column sorting.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::domains::auth::models::Profile;
use crate::domains::dashboard::models::GrowthData;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One table row: a member and their twelve months of growth. `None` means
/// no data for that month.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    pub profile_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub months: [Option<f64>; 12],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    /// 0-based month column index.
    Month(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Clicking a header: the same column flips direction, a new column starts
/// ascending.
pub fn toggle_sort(
    current: (SortColumn, SortDirection),
    clicked: SortColumn,
) -> (SortColumn, SortDirection) {
    if current.0 == clicked {
        (clicked, current.1.flipped())
    } else {
        (clicked, SortDirection::Asc)
    }
}

/// Join profiles with growth rows. Growth data is keyed by lowercased
/// `email_key`; the first value seen for a given member-month wins. Months
/// outside 1–12 are dropped.
pub fn build_rows(profiles: &[Profile], growth_data: &[GrowthData]) -> Vec<DashboardRow> {
    let mut lookup: HashMap<String, HashMap<usize, f64>> = HashMap::new();
    for gd in growth_data {
        if !(1..=12).contains(&gd.month) {
            continue;
        }
        let months = lookup.entry(gd.email_key.to_lowercase()).or_default();
        months.entry(gd.month as usize - 1).or_insert(gd.growth_pct);
    }

    profiles
        .iter()
        .map(|p| {
            let key = p.email.as_deref().unwrap_or_default().to_lowercase();
            let by_month = lookup.get(&key);
            let mut months = [None; 12];
            if let Some(by_month) = by_month {
                for (idx, slot) in months.iter_mut().enumerate() {
                    *slot = by_month.get(&idx).copied();
                }
            }
            DashboardRow {
                profile_id: p.id,
                first_name: p.first_name.clone().unwrap_or_default(),
                last_name: p.last_name.clone().unwrap_or_default(),
                months,
            }
        })
        .collect()
}

/// Sort in place. Name sorts last-then-first, case-insensitively. A month
/// column sorts numerically with empty cells ordered after values (the
/// whole ordering reverses for descending).
pub fn sort_rows(rows: &mut [DashboardRow], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let cmp = match column {
            SortColumn::Name => a
                .last_name
                .to_lowercase()
                .cmp(&b.last_name.to_lowercase())
                .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase())),
            SortColumn::Month(idx) => {
                let va = a.months.get(idx).copied().flatten();
                let vb = b.months.get(idx).copied().flatten();
                match (va, vb) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(va), Some(vb)) => va.partial_cmp(&vb).unwrap_or(Ordering::Equal),
                }
            }
        };
        match direction {
            SortDirection::Asc => cmp,
            SortDirection::Desc => cmp.reverse(),
        }
    });
}

/// "—" for no data, otherwise a signed percentage with two decimals.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        None => "—".to_string(),
        Some(v) => {
            let sign = if v >= 0.0 { "+" } else { "" };
            format!("{sign}{v:.2}%")
        }
    }
}
