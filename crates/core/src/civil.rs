//! Civil-day arithmetic.
//!
//! A [`CivilDay`] is the *only* vocabulary the system uses for "day". Every
//! instant is converted through [`CivilClock::day_of`] before any
//! day-equality or day-ordering decision; raw timestamps are never compared
//! for day-boundary purposes. The day boundary is a fixed local wall-clock
//! hour (e.g. the day rolls over at 03:00 local, not at UTC midnight), so a
//! 02:59 check-in still counts toward the previous day.

use std::fmt;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// An opaque, totally ordered calendar-date label under the product's
/// day-boundary rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CivilDay(NaiveDate);

impl CivilDay {
    /// Wrap an already-derived calendar date (e.g. a DATE column read back
    /// from the store).
    pub fn from_date(date: NaiveDate) -> Self {
        CivilDay(date)
    }

    /// The underlying calendar date, for binding into DATE columns.
    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Whole civil days elapsed since `earlier`. Negative if `earlier` is
    /// actually later.
    pub fn days_since(self, earlier: CivilDay) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    /// The following civil day.
    pub fn next(self) -> Self {
        CivilDay(self.0 + Duration::days(1))
    }
}

impl fmt::Display for CivilDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ISO 8601 date, e.g. `2026-08-23`.
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Converts absolute instants into [`CivilDay`] labels for a fixed reference
/// timezone and boundary hour.
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    tz: Tz,
    boundary_hour: u32,
}

impl CivilClock {
    /// Build a clock from an IANA timezone name and a boundary hour in
    /// `0..=23`. An unknown timezone or out-of-range hour is a configuration
    /// error; callers treat it as fatal at startup.
    pub fn new(timezone: &str, boundary_hour: u32) -> Result<Self, CoreError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| CoreError::Configuration(format!("Unknown IANA timezone: {timezone}")))?;
        if boundary_hour > 23 {
            return Err(CoreError::Configuration(format!(
                "Day boundary hour must be 0..=23, got {boundary_hour}"
            )));
        }
        Ok(CivilClock { tz, boundary_hour })
    }

    /// The civil day that `instant` belongs to.
    ///
    /// Conversion uses the UTC offset in effect *at that instant* (so DST
    /// transitions are handled by chrono-tz, not by a cached offset). The
    /// boundary shift then happens on the resulting wall-clock time, not in
    /// absolute time; shifting the `DateTime<Tz>` itself would re-resolve
    /// the offset at `instant - boundary` and mislabel instants near a
    /// transition.
    pub fn day_of(&self, instant: Timestamp) -> CivilDay {
        let local = instant.with_timezone(&self.tz).naive_local();
        let shifted = local - Duration::hours(i64::from(self.boundary_hour));
        CivilDay(shifted.date())
    }

    /// The civil day containing the current instant.
    pub fn today(&self) -> CivilDay {
        self.day_of(chrono::Utc::now())
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn boundary_hour(&self) -> u32 {
        self.boundary_hour
    }
}
