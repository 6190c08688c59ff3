use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How a computed date lands inside its target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Keep the opened day-of-month, clamped to the target month's length.
    PreserveDay,
    /// Always snap to the last day of the target month.
    EndOfMonth,
}

/// Shelf life of a product type once opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryRule {
    pub duration_months: u32,
    pub anchor: AnchorPolicy,
}

impl ExpiryRule {
    pub fn new(duration_months: u32, anchor: AnchorPolicy) -> Self {
        Self {
            duration_months,
            anchor,
        }
    }
}

/// Derives the expiry date for a product opened on `opened`.
///
/// `PreserveDay` clamps to the end of short months (Jan 31 + 1 month is
/// Feb 28/29), `EndOfMonth` always returns the target month's last day.
/// Returns `None` only when the target falls outside chrono's calendar range.
pub fn compute_expiry(opened: NaiveDate, rule: ExpiryRule) -> Option<NaiveDate> {
    // checked_add_months already clamps the day to the target month's length.
    let shifted = opened.checked_add_months(Months::new(rule.duration_months))?;
    match rule.anchor {
        AnchorPolicy::PreserveDay => Some(shifted),
        AnchorPolicy::EndOfMonth => {
            let last = last_day_of_month(shifted.year(), shifted.month());
            shifted.with_day(last)
        }
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Parses a `YYYY-MM-DD` form value.
///
/// The parsed date is formatted again and must reproduce the input exactly,
/// so overflowing days (`2024-02-30`) and unpadded parts are rejected.
pub fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if to_ymd(date) != raw {
        return None;
    }
    Some(date)
}

pub fn to_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn preserve_day_clamps_to_leap_february() {
        let rule = ExpiryRule::new(1, AnchorPolicy::PreserveDay);
        assert_eq!(compute_expiry(ymd(2024, 1, 31), rule), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn preserve_day_clamps_to_common_february() {
        let rule = ExpiryRule::new(1, AnchorPolicy::PreserveDay);
        assert_eq!(compute_expiry(ymd(2023, 1, 31), rule), Some(ymd(2023, 2, 28)));
    }

    #[test]
    fn end_of_month_rolls_over_year() {
        let rule = ExpiryRule::new(14, AnchorPolicy::EndOfMonth);
        assert_eq!(compute_expiry(ymd(2024, 6, 15), rule), Some(ymd(2025, 8, 31)));
    }

    #[test]
    fn zero_months_end_of_month_snaps_within_month() {
        let rule = ExpiryRule::new(0, AnchorPolicy::EndOfMonth);
        assert_eq!(compute_expiry(ymd(2024, 3, 10), rule), Some(ymd(2024, 3, 31)));
    }

    #[test]
    fn zero_months_preserve_day_is_identity() {
        let rule = ExpiryRule::new(0, AnchorPolicy::PreserveDay);
        let mut date = ymd(2023, 1, 1);
        while date < ymd(2025, 1, 1) {
            assert_eq!(compute_expiry(date, rule), Some(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn results_stay_inside_their_month() {
        let anchors = [AnchorPolicy::PreserveDay, AnchorPolicy::EndOfMonth];
        for months in [0, 1, 2, 11, 12, 13, 25, 36, 121] {
            for anchor in anchors {
                let rule = ExpiryRule::new(months, anchor);
                for day in [1, 15, 28, 29, 30, 31] {
                    for month in 1..=12 {
                        let Some(opened) = NaiveDate::from_ymd_opt(2023, month, day) else {
                            continue;
                        };
                        let result = compute_expiry(opened, rule).unwrap();
                        let last = last_day_of_month(result.year(), result.month());
                        assert!(result.day() <= last);
                        if anchor == AnchorPolicy::EndOfMonth {
                            assert_eq!(result.day(), last);
                        }
                        let expected_total = opened.month() + months - 1;
                        assert_eq!(result.month(), expected_total % 12 + 1);
                        assert_eq!(result.year(), 2023 + (expected_total / 12) as i32);
                    }
                }
            }
        }
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2023, 2), 28);
        assert_eq!(last_day_of_month(1900, 2), 28);
        assert_eq!(last_day_of_month(2000, 2), 29);
        assert_eq!(last_day_of_month(2024, 12), 31);
        assert_eq!(last_day_of_month(2024, 4), 30);
    }

    #[test]
    fn parse_rejects_overflowing_days() {
        assert_eq!(parse_ymd("2024-02-30"), None);
        assert_eq!(parse_ymd("2023-04-31"), None);
        assert_eq!(parse_ymd("2023-02-29"), None);
        assert_eq!(parse_ymd("2024-02-29"), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn parse_requires_exact_round_trip() {
        assert_eq!(parse_ymd("2024-2-05"), None);
        assert_eq!(parse_ymd("2024-02"), None);
        assert_eq!(parse_ymd(""), None);
        assert_eq!(parse_ymd("2024-02-05T00:00"), None);
        assert_eq!(parse_ymd("2024-13-01"), None);
        assert_eq!(parse_ymd("2024-06-15"), Some(ymd(2024, 6, 15)));
        assert_eq!(to_ymd(ymd(2024, 6, 5)), "2024-06-05");
    }
}
