//! Property-based test generators using proptest.
//!
//! Strategies keep the invariants of a post log: every count is at least 1
//! and every date is a real calendar day.

use chrono::{Days, NaiveDate};
use postlog_codec::PostLog;
use postlog_sync_engine::{IncludeMask, PostSummary, Visibility};
use proptest::prelude::*;

/// First day produced by [`date_strategy`].
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid epoch")
}

/// Strategy for calendar days between 2000 and the end of 2099.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..36_524).prop_map(|offset| epoch() + Days::new(offset))
}

/// Strategy for valid post counts.
pub fn count_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        8 => 1u32..10,
        1 => 10u32..10_000,
        1 => Just(u32::MAX),
    ]
}

/// Strategy for post logs with up to `max_days` days.
pub fn post_log_strategy(max_days: usize) -> impl Strategy<Value = PostLog> {
    prop::collection::btree_map(date_strategy(), count_strategy(), 0..=max_days)
        .prop_map(|days| days.into_iter().collect())
}

/// Strategy for post visibilities.
pub fn visibility_strategy() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Private),
        Just(Visibility::Protected),
        Just(Visibility::Published),
    ]
}

/// Strategy for inclusion masks.
pub fn include_mask_strategy() -> impl Strategy<Value = IncludeMask> {
    prop::array::uniform3(any::<bool>()).prop_map(|flags| {
        let text: String = flags.iter().map(|&f| if f { '1' } else { '0' }).collect();
        text.parse().expect("three binary digits")
    })
}

/// Strategy for update ranges, including out-of-range requests.
pub fn update_range_strategy() -> impl Strategy<Value = Option<u32>> {
    prop::option::of(0u32..40)
}

/// Strategy for a listing ending on or before `today`, most recent first.
///
/// Posts span roughly the two years before `today`.
pub fn listing_strategy(today: NaiveDate, max_posts: usize) -> impl Strategy<Value = Vec<PostSummary>> {
    prop::collection::vec((0u64..730, visibility_strategy()), 0..=max_posts).prop_map(
        move |mut posts| {
            posts.sort_by_key(|(age, _)| *age);
            posts
                .into_iter()
                .map(|(age, visibility)| PostSummary::new(today - Days::new(age), visibility))
                .collect()
        },
    )
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_logs_have_positive_counts(log in post_log_strategy(32)) {
            prop_assert!(log.iter().all(|(_, count)| count >= 1));
        }

        #[test]
        fn listings_are_most_recent_first(listing in listing_strategy(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 40)) {
            prop_assert!(listing.windows(2).all(|w| w[0].date >= w[1].date));
        }

        #[test]
        fn masks_round_trip_through_text(mask in include_mask_strategy()) {
            let parsed: IncludeMask = mask.to_string().parse().unwrap();
            prop_assert_eq!(parsed, mask);
        }
    }
}
