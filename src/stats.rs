use crate::catalog::Catalog;
use crate::models::{AppData, ExpiryStatsResponse, ItemStatus};
use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryBucket {
    Expired,
    Week,
    Biweek,
    Month,
    Safe,
}

impl ExpiryBucket {
    pub fn for_days_left(days_left: i64) -> Self {
        match days_left {
            d if d < 0 => Self::Expired,
            0..=7 => Self::Week,
            8..=14 => Self::Biweek,
            15..=30 => Self::Month,
            _ => Self::Safe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Week => "week",
            Self::Biweek => "biweek",
            Self::Month => "month",
            Self::Safe => "safe",
        }
    }
}

pub fn days_left(today: NaiveDate, expires_on: NaiveDate) -> i64 {
    (expires_on - today).num_days()
}

pub fn build_stats(data: &AppData, catalog: &Catalog) -> ExpiryStatsResponse {
    build_stats_at(Local::now().date_naive(), data, catalog)
}

/// Counts items still in use by how close they are to expiry, and by
/// top-level category.
pub fn build_stats_at(today: NaiveDate, data: &AppData, catalog: &Catalog) -> ExpiryStatsResponse {
    let mut stats = ExpiryStatsResponse::default();

    for item in data.items.iter().filter(|item| item.status == ItemStatus::Using) {
        let counter = match ExpiryBucket::for_days_left(days_left(today, item.expires_on)) {
            ExpiryBucket::Expired => &mut stats.expired,
            ExpiryBucket::Week => &mut stats.week,
            ExpiryBucket::Biweek => &mut stats.biweek,
            ExpiryBucket::Month => &mut stats.month,
            ExpiryBucket::Safe => &mut stats.safe,
        };
        *counter = counter.saturating_add(1);

        let category = catalog
            .get(&item.product_type)
            .map(|t| t.top_category().to_string())
            .unwrap_or_else(|| "Other".to_string());
        *stats.by_category.entry(category).or_default() += 1;
    }

    stats
}
