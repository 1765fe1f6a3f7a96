//! Update window and one-year retention.
//!
//! Both the staleness window and the retention horizon are computed with
//! calendar-month subtraction. Subtracting from the 31st lands on the last
//! day of a shorter month (`2024-03-31` minus one month is `2024-02-29`).

use chrono::{Months, NaiveDate};
use postlog_codec::PostLog;

/// Smallest update range, in months.
pub const MIN_UPDATE_RANGE: u32 = 1;

/// Largest update range, in months. Also the retention length.
pub const MAX_UPDATE_RANGE: u32 = 12;

/// Returns the date `months` calendar months before `today`.
pub fn months_before(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Decides which part of the stored log is recomputed and which is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    retention_months: u32,
}

impl RetentionPolicy {
    /// Policy keeping `retention_months` months of history.
    pub fn new(retention_months: u32) -> Self {
        Self {
            retention_months: retention_months.max(MIN_UPDATE_RANGE),
        }
    }

    /// Number of months retained.
    pub fn retention_months(&self) -> u32 {
        self.retention_months
    }

    /// Effective update range for a run.
    ///
    /// A first run (empty stored log) always recomputes the whole retention
    /// period; otherwise the request is clamped to `[1, 12]`, defaulting to 1.
    pub fn update_range(&self, requested: Option<u32>, stored_is_empty: bool) -> u32 {
        if stored_is_empty {
            return MAX_UPDATE_RANGE;
        }
        requested
            .unwrap_or(MIN_UPDATE_RANGE)
            .clamp(MIN_UPDATE_RANGE, MAX_UPDATE_RANGE)
    }

    /// Oldest date still retained.
    pub fn retention_horizon(&self, today: NaiveDate) -> NaiveDate {
        months_before(today, self.retention_months)
    }

    /// Removes every day on or after `cutoff`, returning how many were removed.
    ///
    /// Those days are recounted from scratch, so nothing is ever added on
    /// top of a stale count.
    pub fn cut_window(log: &mut PostLog, cutoff: NaiveDate) -> usize {
        let before = log.len();
        log.retain(|date, _| date < cutoff);
        before - log.len()
    }

    /// Removes every day older than the retention horizon, returning how many
    /// were removed.
    pub fn drop_expired(&self, log: &mut PostLog, today: NaiveDate) -> usize {
        let horizon = self.retention_horizon(today);
        let before = log.len();
        log.retain(|date, _| date >= horizon);
        before - log.len()
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(MAX_UPDATE_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_subtraction_is_calendar_correct() {
        assert_eq!(months_before(day(2024, 3, 31), 1), day(2024, 2, 29));
        assert_eq!(months_before(day(2023, 3, 31), 1), day(2023, 2, 28));
        assert_eq!(months_before(day(2024, 1, 15), 12), day(2023, 1, 15));
        assert_eq!(months_before(day(2024, 5, 31), 3), day(2024, 2, 29));
    }

    #[test]
    fn update_range_rules() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.update_range(None, true), 12);
        assert_eq!(policy.update_range(Some(2), true), 12);
        assert_eq!(policy.update_range(None, false), 1);
        assert_eq!(policy.update_range(Some(0), false), 1);
        assert_eq!(policy.update_range(Some(5), false), 5);
        assert_eq!(policy.update_range(Some(40), false), 12);
    }

    #[test]
    fn cut_window_removes_cutoff_and_later() {
        let mut log: PostLog = vec![
            (day(2024, 1, 31), 1),
            (day(2024, 2, 1), 2),
            (day(2024, 2, 10), 3),
        ]
        .into_iter()
        .collect();
        let removed = RetentionPolicy::cut_window(&mut log, day(2024, 2, 1));
        assert_eq!(removed, 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(day(2024, 1, 31)), 1);
    }

    #[test]
    fn drop_expired_keeps_horizon_day() {
        let policy = RetentionPolicy::default();
        let today = day(2024, 6, 15);
        let mut log: PostLog = vec![
            (day(2023, 6, 14), 1),
            (day(2023, 6, 15), 2),
            (day(2024, 6, 1), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(policy.drop_expired(&mut log, today), 1);
        assert_eq!(log.first_date(), Some(day(2023, 6, 15)));
    }
}
