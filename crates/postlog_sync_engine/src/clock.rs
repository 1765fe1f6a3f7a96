//! Wall-clock source for windowing and storage titles.

use crate::error::{SyncError, SyncResult};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Zone used when none is configured; the blog platform runs on Korean time.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// Zone name that selects the host's local zone.
pub const LOCAL_TIMEZONE: &str = "local";

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the system clock, in the host's zone or a configured one.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    /// Clock in the host's local zone.
    pub fn local() -> Self {
        Self { timezone: None }
    }

    /// Clock in the given IANA zone.
    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone: Some(timezone),
        }
    }

    /// Clock for an optional zone name.
    ///
    /// No name selects [`DEFAULT_TIMEZONE`]; [`LOCAL_TIMEZONE`] selects the
    /// host's zone; anything else must be an IANA zone name.
    pub fn from_name(name: Option<&str>) -> SyncResult<Self> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Ok(Self::default()),
            Some(n) if n.eq_ignore_ascii_case(LOCAL_TIMEZONE) => Ok(Self::local()),
            Some(n) => n
                .parse::<Tz>()
                .map(Self::in_timezone)
                .map_err(|e| SyncError::Configuration(format!("unknown timezone {n:?}: {e}"))),
        }
    }

    /// The configured zone, if any.
    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::in_timezone(DEFAULT_TIMEZONE)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    /// Clock that always reads `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Clock that reads midday on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            now: date.and_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
