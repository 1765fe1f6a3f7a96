//! Post log decoder.

use crate::error::{CodecError, CodecResult};
use crate::log::PostLog;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern"));

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]*$").expect("valid count pattern"));

/// Decode whitespace-separated `YYYY-MM-DD:COUNT` tokens into a log.
///
/// Empty (or all-whitespace) text decodes to an empty log. When a date
/// appears more than once the last occurrence wins.
///
/// # Errors
///
/// Fails on the first token that is not exactly two colon-separated parts
/// ([`CodecError::MalformedToken`]), whose date is not a real `YYYY-MM-DD`
/// calendar day ([`CodecError::InvalidDate`]), or whose count is not a
/// positive integer without leading zeros ([`CodecError::InvalidCount`]).
pub fn decode(text: &str) -> CodecResult<PostLog> {
    let mut log = PostLog::new();
    for token in text.split_whitespace() {
        let (date, count) = decode_token(token)?;
        log.insert(date, count);
    }
    Ok(log)
}

/// Decode a single `DATE:COUNT` token.
pub fn decode_token(token: &str) -> CodecResult<(NaiveDate, u32)> {
    let mut parts = token.split(':');
    let (date_part, count_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(count), None) => (date, count),
        _ => return Err(CodecError::malformed_token(token)),
    };

    if !DATE_PATTERN.is_match(date_part) {
        return Err(CodecError::invalid_date(date_part));
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CodecError::invalid_date(date_part))?;

    if !COUNT_PATTERN.is_match(count_part) {
        return Err(CodecError::invalid_count(count_part));
    }
    let count = count_part
        .parse::<u32>()
        .map_err(|_| CodecError::invalid_count(count_part))?;

    Ok((date, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_text_is_empty_log() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn decodes_tokens() {
        let log = decode("2024-01-01:2 2024-01-02:1").unwrap();
        assert_eq!(log.get(day(2024, 1, 1)), 2);
        assert_eq!(log.get(day(2024, 1, 2)), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn tolerates_irregular_whitespace() {
        let log = decode("\n 2024-01-01:2\t\t2024-01-02:1 \n").unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn last_duplicate_wins() {
        let log = decode("2024-01-01:2 2024-01-01:7").unwrap();
        assert_eq!(log.get(day(2024, 1, 1)), 7);
    }

    #[test]
    fn rejects_garbage_token() {
        assert_eq!(
            decode("garbage"),
            Err(CodecError::malformed_token("garbage"))
        );
        assert!(matches!(
            decode("2024-01-01:1:2"),
            Err(CodecError::MalformedToken { .. })
        ));
    }

    #[test]
    fn rejects_impossible_month() {
        assert_eq!(
            decode("2021-13-01:2"),
            Err(CodecError::invalid_date("2021-13-01"))
        );
    }

    #[test]
    fn rejects_badly_shaped_date() {
        assert!(matches!(
            decode("21-1-1:2"),
            Err(CodecError::InvalidDate { .. })
        ));
        assert!(matches!(
            decode("2021-02-30:2"),
            Err(CodecError::InvalidDate { .. })
        ));
    }

    #[test]
    fn rejects_zero_and_leading_zero_counts() {
        assert_eq!(
            decode("2021-01-01:0"),
            Err(CodecError::invalid_count("0"))
        );
        assert!(matches!(
            decode("2021-01-01:01"),
            Err(CodecError::InvalidCount { .. })
        ));
        assert!(matches!(
            decode("2021-01-01:-3"),
            Err(CodecError::InvalidCount { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_count() {
        assert!(matches!(
            decode("2021-01-01:99999999999"),
            Err(CodecError::InvalidCount { .. })
        ));
    }

    #[test]
    fn one_bad_token_fails_whole_blob() {
        assert!(decode("2024-01-01:2 oops 2024-01-03:1").is_err());
    }
}
