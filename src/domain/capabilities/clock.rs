//! Clock & Calendar capability.
//!
//! Pure, injectable wall-clock/calendar authority. All downstream
//! components receive this by injection; tests substitute `FrozenClock`.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc, Weekday};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
    fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Real wall-clock time, with a configurable holiday set sourced from
/// `Config::holiday_set`. An empty set is acceptable for v1.
pub struct SystemClock {
    holidays: HashSet<NaiveDate>,
}

impl SystemClock {
    pub fn new(holidays: HashSet<NaiveDate>) -> Self {
        Self { holidays }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(HashSet::new())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

/// A clock frozen at a fixed instant, for deterministic tests.
pub struct FrozenClock {
    frozen_at: DateTime<Utc>,
    holidays: HashSet<NaiveDate>,
}

impl FrozenClock {
    pub fn new(frozen_at: DateTime<Utc>) -> Self {
        Self {
            frozen_at,
            holidays: HashSet::new(),
        }
    }

    pub fn with_holidays(mut self, holidays: HashSet<NaiveDate>) -> Self {
        self.holidays = holidays;
        self
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.frozen_at
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}
