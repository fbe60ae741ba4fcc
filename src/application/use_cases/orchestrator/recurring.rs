//! Recurring-pattern generator.
//!
//! Expands a `RecurringShiftPattern` into concrete shift dates up to a
//! caller-supplied horizon. Idempotent: re-running with the same or a
//! later horizon never duplicates a shift already covering a date for
//! that pattern's template/employee key, and regenerates any date in
//! range whose shift was since deleted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::fairness_engine::{FairnessEngine, FairnessWindow};
use crate::domain::entities::{RecurrenceKind, RecurringShiftPattern, Shift};
use crate::domain::errors::CoreResult;
use crate::domain::repositories::{DomainStore, ShiftQuery};
use crate::domain::value_objects::{EmployeeId, ShiftId, ShiftStatus};
use crate::Config;

pub struct RecurringPatternGenerator<'a> {
    store: &'a dyn DomainStore,
    config: &'a Config,
}

impl<'a> RecurringPatternGenerator<'a> {
    pub fn new(store: &'a dyn DomainStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Dates a pattern would generate through `horizon`, without
    /// consulting existing shifts — used by `preview_pattern`. Always
    /// scans from `pattern_start`, not from `last_generated_through`: a
    /// shift deleted from the middle of an already-generated range must
    /// reappear on the next run with the same horizon, and `already_covered`
    /// is what keeps this idempotent for dates that still have a shift.
    pub fn candidate_dates(&self, pattern: &RecurringShiftPattern, horizon: NaiveDate) -> Vec<NaiveDate> {
        let end = pattern.pattern_end.map(|e| e.min(horizon)).unwrap_or(horizon);
        let start = pattern.pattern_start;

        if start > end {
            return Vec::new();
        }

        let mut dates = Vec::new();
        let mut cursor = start;
        let pattern_start_week = pattern.pattern_start.iso_week().week0();

        while cursor <= end {
            let include = match pattern.recurrence {
                RecurrenceKind::Daily => true,
                RecurrenceKind::Weekly => pattern.weekdays.contains(&cursor.weekday()),
                RecurrenceKind::Biweekly => {
                    pattern.weekdays.contains(&cursor.weekday())
                        && (cursor.iso_week().week0() as i64 - pattern_start_week as i64).rem_euclid(2) == 0
                }
                RecurrenceKind::Monthly => pattern
                    .day_of_month
                    .map(|dom| cursor.day() == dom)
                    .unwrap_or(false),
            };
            if include {
                dates.push(cursor);
            }
            cursor += Duration::days(1);
        }
        dates
    }

    pub fn preview_pattern(&self, pattern: &RecurringShiftPattern, horizon: NaiveDate) -> Vec<NaiveDate> {
        self.candidate_dates(pattern, horizon)
            .into_iter()
            .filter(|date| !self.already_covered(pattern, *date))
            .collect()
    }

    fn already_covered(&self, pattern: &RecurringShiftPattern, date: NaiveDate) -> bool {
        let day_start = Utc.from_utc_datetime(&date.and_time(pattern.start_time));
        let window_end = Utc.from_utc_datetime(&(date + Duration::days(2)).and_hms_opt(0, 0, 0).unwrap());
        self.store
            .shifts(&ShiftQuery {
                employee: pattern.employee,
                team: pattern.team,
                window: Some((day_start - Duration::hours(1), window_end)),
                statuses: None,
            })
            .into_iter()
            .any(|s| s.template_id == pattern.template_id && !s.status.is_cancelled())
    }

    fn pick_employee(&self, pattern: &RecurringShiftPattern, date: NaiveDate) -> Option<EmployeeId> {
        if let Some(employee) = pattern.employee {
            return Some(employee);
        }
        let team = pattern.team?;
        let template = self.store.get_template(pattern.template_id)?;
        let candidates: Vec<EmployeeId> = self
            .store
            .employees_in_team(team)
            .into_iter()
            .filter(|e| e.active && e.available_for_class(template.class))
            .filter(|e| {
                !self
                    .store
                    .leave_requests_overlapping(e.id, date, date)
                    .into_iter()
                    .any(|l| l.status == crate::domain::value_objects::LeaveStatus::Approved)
            })
            .map(|e| e.id)
            .collect();
        let window = FairnessWindow::rolling_year_containing(date, self.config.fairness_window_days);
        FairnessEngine::new(self.store).select_employee(template.class, window, &candidates)
    }

    /// Generates every not-yet-covered date through `horizon` and
    /// advances `last_generated_through`.
    pub fn generate_pattern(
        &self,
        pattern: &mut RecurringShiftPattern,
        horizon: NaiveDate,
    ) -> CoreResult<Vec<ShiftId>> {
        let template = match self.store.get_template(pattern.template_id) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };

        let dates = self.candidate_dates(pattern, horizon);
        let mut shifts = Vec::new();

        for date in &dates {
            if self.already_covered(pattern, *date) {
                continue;
            }
            let employee_id = match self.pick_employee(pattern, *date) {
                Some(id) => id,
                None => continue,
            };

            let start = Utc.from_utc_datetime(&date.and_time(pattern.start_time));
            let end = if pattern.end_time <= pattern.start_time {
                Utc.from_utc_datetime(&(*date + Duration::days(1)).and_time(pattern.end_time))
            } else {
                Utc.from_utc_datetime(&date.and_time(pattern.end_time))
            };

            shifts.push(Shift {
                id: self.store.next_shift_id(),
                template_id: pattern.template_id,
                employee_id,
                class: template.class,
                start,
                end,
                status: ShiftStatus::Scheduled,
                notes: None,
                auto_assigned: true,
                reason: Some(format!("recurring pattern {}", pattern.id)),
            });
        }

        let ids = self.store.apply_generated_shifts(shifts)?;

        if let Some(&last) = dates.last() {
            pattern.last_generated_through = Some(pattern.last_generated_through.map_or(last, |d| d.max(last)));
        } else if pattern.last_generated_through.is_none() {
            pattern.last_generated_through = Some(horizon.min(pattern.pattern_start));
        }
        self.store.update_pattern(pattern.clone())?;

        Ok(ids)
    }
}
