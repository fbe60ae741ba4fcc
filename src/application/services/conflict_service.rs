//! Conflict & Availability Service.
//!
//! Stateless queries over the Domain Store: overlap, hour-cap,
//! leave-conflict, skill-mismatch, staffing, and alternative-date
//! search. Nothing here writes; every operation is a pure function of
//! current store state plus the injected `Config`.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{LeaveRequest, Shift};
use crate::domain::repositories::{DomainStore, ShiftQuery};
use crate::domain::value_objects::{
    AvailabilityState, Conflict, ConflictKind, EmployeeId, ShiftId, ShiftStatus, TeamId,
};
use crate::Config;

pub struct ConflictService<'a> {
    store: &'a dyn DomainStore,
    config: &'a Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaffingDay {
    pub available_staff: u32,
    pub understaffed: bool,
    pub warning: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LeaveConflictReport {
    pub personal_overlaps: Vec<LeaveRequest>,
    pub shift_conflicts: Vec<Shift>,
    pub team_conflicts_by_day: BTreeMap<NaiveDate, Vec<EmployeeId>>,
    pub staffing_analysis: BTreeMap<NaiveDate, StaffingDay>,
}

impl LeaveConflictReport {
    pub fn is_blocking(&self) -> bool {
        !self.personal_overlaps.is_empty() || !self.shift_conflicts.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveDateSuggestion {
    pub candidate_start: NaiveDate,
    pub score: i64,
    pub days_offset: i64,
}

impl<'a> ConflictService<'a> {
    pub fn new(store: &'a dyn DomainStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Conflicts grouped by shift id, in ascending shift id order so
    /// callers never observe enumeration-order-dependent results.
    pub fn detect_shift_conflicts(
        &self,
        window: (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>),
        employee: Option<EmployeeId>,
    ) -> BTreeMap<ShiftId, Vec<Conflict>> {
        let mut shifts = self.store.shifts(&ShiftQuery {
            employee,
            team: None,
            window: Some(window),
            statuses: None,
        });
        shifts.sort_by_key(|s| s.id);

        let mut out: BTreeMap<ShiftId, Vec<Conflict>> = BTreeMap::new();

        for shift in &shifts {
            if shift.status.is_cancelled() {
                continue;
            }
            let mut conflicts = Vec::new();

            let overlapping =
                self.store
                    .overlapping_shifts(shift.employee_id, shift.start, shift.end, Some(shift.id));
            for other in &overlapping {
                let overlap_start = shift.start.max(other.start);
                let overlap_end = shift.end.min(other.end);
                let overlap_hours = (overlap_end - overlap_start).num_seconds() as f64 / 3600.0;
                let kind = ConflictKind::DoubleBooking {
                    conflicting_shift: other.id,
                    overlap_hours,
                };
                conflicts.push(Conflict {
                    shift_id: shift.id,
                    severity: Conflict::severity_for_kind(&kind, false),
                    kind,
                });
            }

            let dates = shift.civil_dates();
            if let (Some(&first), Some(&last)) = (dates.first(), dates.last()) {
                let overlapping_leave = self
                    .store
                    .leave_requests_overlapping(shift.employee_id, first, last)
                    .into_iter()
                    .filter(|l| l.status == crate::domain::value_objects::LeaveStatus::Approved);
                for leave in overlapping_leave {
                    let high = leave.leave_type.is_high_severity();
                    let kind = ConflictKind::LeaveConflict {
                        leave_request: leave.id,
                    };
                    conflicts.push(Conflict {
                        shift_id: shift.id,
                        severity: Conflict::severity_for_kind(&kind, high),
                        kind,
                    });
                }
            }

            let (iso_year, iso_week) = shift.iso_week();
            let week_hours = self
                .store
                .hours_for_iso_week(shift.employee_id, iso_year, iso_week);
            if week_hours > self.config.max_weekly_hours {
                let kind = ConflictKind::OverScheduledWeek {
                    hours: week_hours,
                    limit: self.config.max_weekly_hours,
                };
                conflicts.push(Conflict {
                    shift_id: shift.id,
                    severity: Conflict::severity_for_kind(&kind, false),
                    kind,
                });
            }

            let month_hours = self
                .store
                .hours_for_month(shift.employee_id, shift.start.year(), shift.start.month());
            if month_hours > self.config.max_monthly_hours {
                let kind = ConflictKind::OverScheduledMonth {
                    hours: month_hours,
                    limit: self.config.max_monthly_hours,
                };
                conflicts.push(Conflict {
                    shift_id: shift.id,
                    severity: Conflict::severity_for_kind(&kind, false),
                    kind,
                });
            }

            if let (Some(template), Some(assignee)) = (
                self.store.get_template(shift.template_id),
                self.store.get_employee(shift.employee_id),
            ) {
                if !template.required_skills.is_subset(&assignee.skills) {
                    let missing: Vec<_> = template
                        .required_skills
                        .difference(&assignee.skills)
                        .cloned()
                        .collect();
                    let kind = ConflictKind::SkillMismatch { missing };
                    conflicts.push(Conflict {
                        shift_id: shift.id,
                        severity: Conflict::severity_for_kind(&kind, false),
                        kind,
                    });
                }
            }

            if !conflicts.is_empty() {
                out.insert(shift.id, conflicts);
            }
        }

        out
    }

    pub fn check_leave_conflicts(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        team: Option<TeamId>,
    ) -> LeaveConflictReport {
        let personal_overlaps = self.store.leave_requests_overlapping(employee, start, end);

        let shift_conflicts: Vec<Shift> = self
            .store
            .shifts(&ShiftQuery {
                employee: Some(employee),
                team: None,
                window: None,
                statuses: Some(vec![ShiftStatus::Scheduled, ShiftStatus::Confirmed]),
            })
            .into_iter()
            .filter(|s| s.civil_dates().iter().any(|d| *d >= start && *d <= end))
            .collect();

        let mut team_conflicts_by_day = BTreeMap::new();
        let mut staffing_analysis = BTreeMap::new();

        if let Some(team_id) = team {
            let members = self.store.employees_in_team(team_id);
            let active_members: Vec<_> = members.iter().filter(|e| e.active).collect();

            let mut cursor = start;
            while cursor <= end {
                let on_leave: Vec<EmployeeId> = self
                    .store
                    .approved_leave_on_date(team_id, cursor)
                    .into_iter()
                    .filter(|id| *id != employee)
                    .collect();
                team_conflicts_by_day.insert(cursor, on_leave.clone());

                let on_leave_set: std::collections::HashSet<_> = on_leave.iter().copied().collect();
                let assigned_that_day: std::collections::HashSet<EmployeeId> = active_members
                    .iter()
                    .filter(|e| {
                        self.store
                            .overlapping_shifts(
                                e.id,
                                cursor
                                    .and_hms_opt(0, 0, 0)
                                    .unwrap()
                                    .and_utc(),
                                (cursor + chrono::Duration::days(1))
                                    .and_hms_opt(0, 0, 0)
                                    .unwrap()
                                    .and_utc(),
                                None,
                            )
                            .into_iter()
                            .any(|s| !s.status.is_cancelled())
                    })
                    .map(|e| e.id)
                    .collect();

                let available = active_members
                    .iter()
                    .filter(|e| !on_leave_set.contains(&e.id) && !assigned_that_day.contains(&e.id))
                    .count() as u32;

                staffing_analysis.insert(
                    cursor,
                    StaffingDay {
                        available_staff: available,
                        understaffed: available < self.config.min_required_staff,
                        warning: available == self.config.min_required_staff,
                    },
                );

                cursor += chrono::Duration::days(1);
            }
        }

        LeaveConflictReport {
            personal_overlaps,
            shift_conflicts,
            team_conflicts_by_day,
            staffing_analysis,
        }
    }

    pub fn suggest_alternative_leave_dates(
        &self,
        employee: EmployeeId,
        original_start: NaiveDate,
        days_requested: i64,
        team: Option<TeamId>,
    ) -> Vec<LeaveDateSuggestion> {
        let window = self.config.alternative_search_window_days;
        let mut candidates: Vec<LeaveDateSuggestion> = Vec::new();

        let mut offset = -window;
        while offset <= window {
            let candidate_start = original_start + chrono::Duration::days(offset);
            let candidate_end = candidate_start + chrono::Duration::days(days_requested - 1);

            let personal_overlaps = self
                .store
                .leave_requests_overlapping(employee, candidate_start, candidate_end)
                .len();

            let shift_conflicts = self
                .store
                .shifts(&ShiftQuery {
                    employee: Some(employee),
                    team: None,
                    window: None,
                    statuses: Some(vec![ShiftStatus::Scheduled, ShiftStatus::Confirmed]),
                })
                .into_iter()
                .filter(|s| {
                    s.civil_dates()
                        .iter()
                        .any(|d| *d >= candidate_start && *d <= candidate_end)
                })
                .count();

            if personal_overlaps > 0 || shift_conflicts > 0 {
                offset += 1;
                continue;
            }

            let report = self.check_leave_conflicts(employee, candidate_start, candidate_end, team);
            let team_conflict_days = report
                .team_conflicts_by_day
                .values()
                .filter(|v| !v.is_empty())
                .count() as i64;
            let understaffed_days = report
                .staffing_analysis
                .values()
                .filter(|d| d.understaffed)
                .count() as i64;

            let score =
                (personal_overlaps as i64 * 1000) + team_conflict_days + (understaffed_days * 10);

            candidates.push(LeaveDateSuggestion {
                candidate_start,
                score,
                days_offset: offset,
            });

            offset += 1;
        }

        candidates.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then(a.days_offset.abs().cmp(&b.days_offset.abs()))
                .then(a.candidate_start.cmp(&b.candidate_start))
        });
        candidates.truncate(5);
        candidates
    }

    pub fn availability_matrix(
        &self,
        window: (NaiveDate, NaiveDate),
        employee_ids: &[EmployeeId],
    ) -> HashMap<EmployeeId, BTreeMap<NaiveDate, AvailabilityState>> {
        let mut out = HashMap::new();
        let daily_partial_threshold =
            self.config.max_daily_hours * self.config.partial_availability_threshold;
        let weekly_partial_threshold =
            self.config.max_weekly_hours * self.config.partial_availability_threshold;

        for &employee in employee_ids {
            let mut per_day = BTreeMap::new();
            let mut cursor = window.0;
            while cursor <= window.1 {
                let on_approved_leave = !self
                    .store
                    .leave_requests_overlapping(employee, cursor, cursor)
                    .into_iter()
                    .filter(|l| l.status == crate::domain::value_objects::LeaveStatus::Approved)
                    .collect::<Vec<_>>()
                    .is_empty();
                let on_pending_leave = !self
                    .store
                    .leave_requests_overlapping(employee, cursor, cursor)
                    .into_iter()
                    .filter(|l| l.status == crate::domain::value_objects::LeaveStatus::Pending)
                    .collect::<Vec<_>>()
                    .is_empty();

                let daily_hours = self.store.hours_for_day(employee, cursor);
                let iso = cursor.iso_week();
                let weekly_hours = self.store.hours_for_iso_week(employee, iso.year(), iso.week());

                let day_window = (
                    Utc.from_utc_datetime(&cursor.and_hms_opt(0, 0, 0).unwrap()),
                    Utc.from_utc_datetime(&(cursor + chrono::Duration::days(1)).and_hms_opt(0, 0, 0).unwrap()),
                );
                let has_blocking_conflict = self
                    .detect_shift_conflicts(day_window, Some(employee))
                    .values()
                    .flatten()
                    .any(|c| matches!(c.kind, ConflictKind::DoubleBooking { .. }));

                let state = if on_approved_leave || daily_hours >= self.config.max_daily_hours || has_blocking_conflict {
                    AvailabilityState::Unavailable
                } else if daily_hours >= daily_partial_threshold
                    || weekly_hours >= weekly_partial_threshold
                    || on_pending_leave
                {
                    AvailabilityState::Partial
                } else {
                    AvailabilityState::Available
                };

                per_day.insert(cursor, state);
                cursor += chrono::Duration::days(1);
            }
            out.insert(employee, per_day);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::InMemoryDomainStore;

    #[test]
    fn detect_shift_conflicts_empty_store_yields_no_conflicts() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let service = ConflictService::new(&store, &config);
        let window = (
            chrono::Utc::now(),
            chrono::Utc::now() + chrono::Duration::days(7),
        );
        assert!(service.detect_shift_conflicts(window, None).is_empty());
    }

    #[test]
    fn suggest_alternative_leave_dates_never_overlaps_personal_leave() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let employee = EmployeeId(1);

        let blocked_start = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let blocked_end = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
        store
            .add_leave_request(LeaveRequest {
                id: store.next_leave_request_id(),
                employee_id: employee,
                leave_type: crate::domain::value_objects::LeaveType::Vacation,
                start_date: blocked_start,
                end_date: blocked_end,
                requested_days: 8,
                status: crate::domain::value_objects::LeaveStatus::Approved,
                decider: None,
                decided_at: None,
                reason: None,
                resolution_note: None,
                created_at: chrono::Utc::now(),
                version: 0,
            })
            .unwrap();

        let service = ConflictService::new(&store, &config);
        let suggestions = service.suggest_alternative_leave_dates(
            employee,
            NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            5,
            None,
        );

        for s in &suggestions {
            let candidate_end = s.candidate_start + chrono::Duration::days(4);
            assert!(candidate_end < blocked_start || s.candidate_start > blocked_end);
        }
    }
}
