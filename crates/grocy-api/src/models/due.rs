use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use super::lenient::grocy_datetime::FORMAT;

const SECONDS_PER_DAY: i64 = 86_400;

/// A due marker on a chore, task, battery or meal plan entry.
///
/// Grocy tracks some things to the second and others to the day, and the
/// two are compared differently: timestamps against the current instant,
/// dates against the current calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Due {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Due {
    /// `true` iff the due point lies strictly before `now`.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        match self {
            Self::Date(d) => *d < now.date(),
            Self::DateTime(t) => *t < now,
        }
    }

    /// Whole days from `now` until this due point.
    ///
    /// Timestamps round toward negative infinity, so something due an hour
    /// ago is `-1`. Dates count calendar days.
    pub fn days_until(&self, now: NaiveDateTime) -> i64 {
        match self {
            Self::Date(d) => (*d - now.date()).num_days(),
            Self::DateTime(t) => (*t - now).num_seconds().div_euclid(SECONDS_PER_DAY),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::DateTime(t) => t.date(),
        }
    }

    /// Collapse to calendar-day precision.
    pub fn to_date_only(self) -> Self {
        Self::Date(self.date())
    }
}

impl fmt::Display for Due {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(t) => write!(f, "{}", t.format(FORMAT)),
        }
    }
}

impl Serialize for Due {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}
