//! Core configuration knobs.
//!
//! A plain struct with a documented `Default` and `with_*` builder
//! methods, holding the scheduling knobs consulted by the fairness,
//! conflict, and orchestrator layers rather than transport settings.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tunable limits and defaults consulted by the orchestrator, fairness
/// engine, and conflict service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-day hour cap enforced at shift-assignment time (default 12).
    pub max_daily_hours: f64,
    /// ISO-week hour cap used by `over_scheduled_week` (default 48).
    pub max_weekly_hours: f64,
    /// Calendar-month hour cap used by `over_scheduled_month` (default 200).
    pub max_monthly_hours: f64,
    /// Fraction of a daily/weekly cap that marks a day "partial" (default 0.75).
    pub partial_availability_threshold: f64,
    /// Minimum active staff required per day before `understaffed` fires (default 2).
    pub min_required_staff: u32,
    /// Search radius in days for alternative leave date suggestions (default 60).
    pub alternative_search_window_days: i64,
    /// Length in days of the default fairness window (default 365, rolling).
    pub fairness_window_days: i64,
    /// IANA timezone name the organization's civil dates are computed in.
    pub organization_timezone: String,
    /// Dates treated as holidays for weekday/holiday calculations. May be empty.
    pub holiday_set: HashSet<NaiveDate>,
}

impl Default for Config {
    /// Reasonable out-of-the-box values for a single on-call rotation.
    fn default() -> Self {
        Self {
            max_daily_hours: 12.0,
            max_weekly_hours: 48.0,
            max_monthly_hours: 200.0,
            partial_availability_threshold: 0.75,
            min_required_staff: 2,
            alternative_search_window_days: 60,
            fairness_window_days: 365,
            organization_timezone: "UTC".to_string(),
            holiday_set: HashSet::new(),
        }
    }
}

impl Config {
    /// Creates a `Config` with the given organization timezone and all
    /// other settings left at their defaults.
    pub fn new(organization_timezone: String) -> Self {
        Self {
            organization_timezone,
            ..Default::default()
        }
    }

    pub fn with_min_required_staff(mut self, min_required_staff: u32) -> Self {
        self.min_required_staff = min_required_staff;
        self
    }

    pub fn with_holiday_set(mut self, holiday_set: HashSet<NaiveDate>) -> Self {
        self.holiday_set = holiday_set;
        self
    }

    pub fn with_fairness_window_days(mut self, days: i64) -> Self {
        self.fairness_window_days = days;
        self
    }
}
