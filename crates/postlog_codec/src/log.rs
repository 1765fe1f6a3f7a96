//! The day-to-count post history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Publishing history of a blog: calendar day to number of posts that day.
///
/// A day without posts is absent, so every stored count is at least 1.
/// Iteration is in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostLog {
    days: BTreeMap<NaiveDate, u32>,
}

impl PostLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count recorded for `date`, or 0.
    pub fn get(&self, date: NaiveDate) -> u32 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    /// Sets the count for `date`. A count of 0 removes the day.
    pub fn insert(&mut self, date: NaiveDate, count: u32) {
        if count == 0 {
            self.days.remove(&date);
        } else {
            self.days.insert(date, count);
        }
    }

    /// Adds one post on `date` and returns the new count.
    pub fn increment(&mut self, date: NaiveDate) -> u32 {
        let count = self.days.entry(date).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Removes `date`, returning its previous count.
    pub fn remove(&mut self, date: NaiveDate) -> Option<u32> {
        self.days.remove(&date)
    }

    /// Keeps only the days for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(NaiveDate, u32) -> bool) {
        self.days.retain(|date, count| keep(*date, *count));
    }

    /// Number of days with at least one post.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if no day has a post.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sum of all counts.
    pub fn total_posts(&self) -> u64 {
        self.days.values().map(|&c| u64::from(c)).sum()
    }

    /// Oldest recorded day.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Most recent recorded day.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Iterates `(date, count)` pairs in ascending date order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.days.iter(),
        }
    }
}

/// Iterator over the days of a [`PostLog`].
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, NaiveDate, u32>,
}

impl Iterator for Iter<'_> {
    type Item = (NaiveDate, u32);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(d, c)| (*d, *c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a PostLog {
    type Item = (NaiveDate, u32);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a log from one date per post; repeated dates accumulate.
impl FromIterator<NaiveDate> for PostLog {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        let mut log = PostLog::new();
        for date in iter {
            log.increment(date);
        }
        log
    }
}

impl Extend<(NaiveDate, u32)> for PostLog {
    fn extend<I: IntoIterator<Item = (NaiveDate, u32)>>(&mut self, iter: I) {
        for (date, count) in iter {
            self.insert(date, count);
        }
    }
}

impl FromIterator<(NaiveDate, u32)> for PostLog {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u32)>>(iter: I) -> Self {
        let mut log = PostLog::new();
        log.extend(iter);
        log
    }
}
