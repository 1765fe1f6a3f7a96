//! Post log encoder.

use crate::log::PostLog;
use std::fmt::Write;

/// Encode a log as space-separated `YYYY-MM-DD:COUNT` tokens.
///
/// Tokens are ordered by ascending date, so equal logs always produce
/// identical text. An empty log encodes to the empty string.
pub fn encode(log: &PostLog) -> String {
    let mut out = String::with_capacity(log.len() * 13);
    for (i, (date, count)) in log.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{}:{}", date.format("%Y-%m-%d"), count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_log_encodes_to_empty_string() {
        assert_eq!(encode(&PostLog::new()), "");
    }

    #[test]
    fn tokens_sorted_by_date() {
        let mut log = PostLog::new();
        log.insert(day(2024, 1, 2), 1);
        log.insert(day(2024, 1, 1), 2);
        assert_eq!(encode(&log), "2024-01-01:2 2024-01-02:1");
    }

    #[test]
    fn years_are_zero_padded() {
        let mut log = PostLog::new();
        log.insert(day(987, 5, 6), 12);
        assert_eq!(encode(&log), "0987-05-06:12");
    }
}
