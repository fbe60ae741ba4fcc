//! Per-class shift generators consulted by the orchestrator's `build`
//! step. Each generator is a pure function of store state: given a
//! window and team, it proposes shifts without writing anything.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::application::services::fairness_engine::{FairnessEngine, FairnessWindow};
use crate::domain::repositories::{DomainStore, ShiftQuery};
use crate::domain::value_objects::{
    Conflict, ConflictKind, EmployeeId, Severity, ShiftClass, ShiftTemplateId, TeamId,
};
use crate::Config;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposedShift {
    pub template_id: ShiftTemplateId,
    pub employee_id: EmployeeId,
    pub class: ShiftClass,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
    pub auto_assigned: bool,
    pub reason: String,
}

type Unassigned = (NaiveDate, ShiftClass, String);

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Distinct Monday-of-week dates intersecting `[window.0, window.1)`.
fn weeks_in_window(window: (DateTime<Utc>, DateTime<Utc>)) -> Vec<NaiveDate> {
    let mut weeks = Vec::new();
    let mut cursor = monday_of(window.0.date_naive());
    let last = window.1.date_naive();
    while cursor < last {
        weeks.push(cursor);
        cursor += Duration::days(7);
    }
    weeks
}

/// The most recent Wednesday on or before `date` — the anchor of the
/// waakdienst rotation period containing `date`.
fn wednesday_of(date: NaiveDate) -> NaiveDate {
    let wed = Weekday::Wed.num_days_from_monday() as i64;
    let cur = date.weekday().num_days_from_monday() as i64;
    date - Duration::days((cur - wed).rem_euclid(7))
}

/// Rotation-anchor Wednesdays whose `[Wed 17:00, next Wed 08:00)` period
/// intersects `[window.0, window.1)`, in chronological order.
fn rotation_periods_in_window(window: (DateTime<Utc>, DateTime<Utc>)) -> Vec<NaiveDate> {
    let mut periods = Vec::new();
    let mut cursor = wednesday_of(window.0.date_naive());
    loop {
        let period_end = at(cursor + Duration::days(7), 8);
        if period_end <= window.0 {
            cursor += Duration::days(7);
            continue;
        }
        let period_start = at(cursor, 17);
        if period_start >= window.1 {
            break;
        }
        periods.push(cursor);
        cursor += Duration::days(7);
    }
    periods
}

fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

fn already_generated(
    store: &dyn DomainStore,
    team: TeamId,
    class: ShiftClass,
    probe_start: DateTime<Utc>,
    probe_end: DateTime<Utc>,
) -> bool {
    store
        .shifts(&ShiftQuery {
            employee: None,
            team: Some(team),
            window: Some((probe_start, probe_end)),
            statuses: None,
        })
        .into_iter()
        .any(|s| s.class == class && !s.status.is_cancelled())
}

fn on_approved_leave(store: &dyn DomainStore, employee: EmployeeId, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    store
        .leave_requests_overlapping(employee, start.date_naive(), end.date_naive())
        .into_iter()
        .any(|l| l.status == crate::domain::value_objects::LeaveStatus::Approved)
}

/// Double-bookings `employee` would incur over `blocks` against shifts
/// already in the store. Only meaningful when `force` bypassed the
/// overlap filter in `eligible_for_week` — the caller is responsible for
/// only invoking this when that is the case.
fn conflicts_for_assignment(
    store: &dyn DomainStore,
    employee: EmployeeId,
    blocks: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (start, end) in blocks {
        for other in store.overlapping_shifts(employee, *start, *end, None) {
            let overlap_start = (*start).max(other.start);
            let overlap_end = (*end).min(other.end);
            let overlap_hours = (overlap_end - overlap_start).num_seconds() as f64 / 3600.0;
            conflicts.push(Conflict {
                shift_id: other.id,
                severity: Severity::High,
                kind: ConflictKind::DoubleBooking {
                    conflicting_shift: other.id,
                    overlap_hours,
                },
            });
        }
    }
    conflicts
}

fn eligible_for_week(
    store: &dyn DomainStore,
    team: TeamId,
    class: ShiftClass,
    week_blocks: &[(DateTime<Utc>, DateTime<Utc>)],
    force: bool,
    exclude: &[EmployeeId],
) -> Vec<EmployeeId> {
    store
        .employees_in_team(team)
        .into_iter()
        .filter(|e| e.active && e.available_for_class(class))
        .filter(|e| !exclude.contains(&e.id))
        .filter(|e| {
            force
                || week_blocks
                    .iter()
                    .all(|(s, e2)| store.overlapping_shifts(e.id, *s, *e2, None).is_empty())
        })
        .filter(|e| force || week_blocks.iter().all(|(s, e2)| !on_approved_leave(store, e.id, *s, *e2)))
        .map(|e| e.id)
        .collect()
}

pub fn generate_incidents(
    store: &dyn DomainStore,
    config: &Config,
    window: (DateTime<Utc>, DateTime<Utc>),
    team: TeamId,
    force: bool,
    incidents_employee_by_week: &mut HashMap<(i32, u32), EmployeeId>,
) -> (Vec<ProposedShift>, Vec<Unassigned>, Vec<Conflict>) {
    let mut created = Vec::new();
    let mut unassigned = Vec::new();
    let mut conflicts = Vec::new();

    let template = match store
        .list_templates()
        .into_iter()
        .find(|t| t.class == ShiftClass::Incidents && t.active)
    {
        Some(t) => t,
        None => {
            for monday in weeks_in_window(window) {
                unassigned.push((
                    monday,
                    ShiftClass::Incidents,
                    "no active incidents template configured".to_string(),
                ));
            }
            return (created, unassigned, conflicts);
        }
    };

    for monday in weeks_in_window(window) {
        let blocks: Vec<(DateTime<Utc>, DateTime<Utc>)> = (0..5)
            .map(|offset| {
                let day = monday + Duration::days(offset);
                (at(day, 8), at(day, 17))
            })
            .collect();

        if already_generated(store, team, ShiftClass::Incidents, blocks[0].0, blocks[4].1) {
            continue;
        }

        let iso = monday.iso_week();
        let fairness_window =
            FairnessWindow::rolling_year_containing(monday, config.fairness_window_days);
        let candidates = eligible_for_week(store, team, ShiftClass::Incidents, &blocks, force, &[]);

        let engine = FairnessEngine::new(store);
        match engine.select_employee(ShiftClass::Incidents, fairness_window, &candidates) {
            None => unassigned.push((
                monday,
                ShiftClass::Incidents,
                "no eligible employee for the week".to_string(),
            )),
            Some(employee_id) => {
                incidents_employee_by_week.insert((iso.year(), iso.week()), employee_id);
                if force {
                    conflicts.extend(conflicts_for_assignment(store, employee_id, &blocks));
                }
                for (start, end) in blocks {
                    created.push(ProposedShift {
                        template_id: template.id,
                        employee_id,
                        class: ShiftClass::Incidents,
                        start,
                        end,
                        duration_hours: (end - start).num_seconds() as f64 / 3600.0,
                        auto_assigned: true,
                        reason: format!("incidents rotation for week of {monday}"),
                    });
                }
            }
        }
    }

    (created, unassigned, conflicts)
}

/// Seven intervals covering one rotation period `[Wed 17:00, next Wed
/// 08:00)`, all held by the same Employee: four weeknight blocks
/// (Wed-Thu, Thu-Fri, Mon-Tue, Tue-Wed), a short Friday-evening block
/// capped at the weekend boundary, the Sat-Sun weekend block, and the
/// Monday pre-incidents block that covers the gap left once the weekend
/// block ends at Sunday 23:59 and before the Monday incidents shift
/// starts at 08:00.
fn waakdienst_blocks(wednesday: NaiveDate) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let thu = wednesday + Duration::days(1);
    let fri = wednesday + Duration::days(2);
    let sat = wednesday + Duration::days(3);
    let mon = wednesday + Duration::days(5);
    let tue = wednesday + Duration::days(6);
    let next_wednesday = wednesday + Duration::days(7);

    vec![
        (at(wednesday, 17), at(thu, 8)),
        (at(thu, 17), at(fri, 8)),
        (at(fri, 17), at(sat, 0)),
        (at(sat, 0), at(mon, 0)),
        (at(mon, 0), at(mon, 8)),
        (at(mon, 17), at(tue, 8)),
        (at(tue, 17), at(next_wednesday, 8)),
    ]
}

pub fn generate_waakdienst(
    store: &dyn DomainStore,
    config: &Config,
    window: (DateTime<Utc>, DateTime<Utc>),
    team: TeamId,
    force: bool,
    incidents_employee_by_week: &HashMap<(i32, u32), EmployeeId>,
) -> (Vec<ProposedShift>, Vec<Unassigned>, Vec<Conflict>) {
    let mut created = Vec::new();
    let mut unassigned = Vec::new();
    let mut conflicts = Vec::new();

    let template = match store
        .list_templates()
        .into_iter()
        .find(|t| t.class == ShiftClass::Waakdienst && t.active)
    {
        Some(t) => t,
        None => {
            for wednesday in rotation_periods_in_window(window) {
                unassigned.push((
                    wednesday,
                    ShiftClass::Waakdienst,
                    "no active waakdienst template configured".to_string(),
                ));
            }
            return (created, unassigned, conflicts);
        }
    };

    for wednesday in rotation_periods_in_window(window) {
        let blocks = waakdienst_blocks(wednesday);
        let probe_start = blocks[0].0;
        let probe_end = blocks.last().unwrap().1;

        if already_generated(store, team, ShiftClass::Waakdienst, probe_start, probe_end) {
            continue;
        }

        let visible: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
            .iter()
            .copied()
            .filter(|(s, e)| *s >= window.0 && *e <= window.1)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let exclude: Vec<EmployeeId> = (0..7)
            .map(|offset| (wednesday + Duration::days(offset)).iso_week())
            .map(|w| (w.year(), w.week()))
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .filter_map(|k| incidents_employee_by_week.get(&k).copied())
            .collect();

        let fairness_window =
            FairnessWindow::rolling_year_containing(wednesday, config.fairness_window_days);
        let candidates =
            eligible_for_week(store, team, ShiftClass::Waakdienst, &blocks, force, &exclude);

        let engine = FairnessEngine::new(store);
        match engine.select_employee(ShiftClass::Waakdienst, fairness_window, &candidates) {
            None => unassigned.push((
                wednesday,
                ShiftClass::Waakdienst,
                "no eligible employee for the rotation".to_string(),
            )),
            Some(employee_id) => {
                if force {
                    conflicts.extend(conflicts_for_assignment(store, employee_id, &blocks));
                }
                for (start, end) in visible {
                    created.push(ProposedShift {
                        template_id: template.id,
                        employee_id,
                        class: ShiftClass::Waakdienst,
                        start,
                        end,
                        duration_hours: (end - start).num_seconds() as f64 / 3600.0,
                        auto_assigned: true,
                        reason: format!("waakdienst rotation starting {wednesday}"),
                    });
                }
            }
        }
    }

    (created, unassigned, conflicts)
}

/// Fill for eligible engineers not on incidents that week; never
/// overlaps incidents for the same Employee. One day-length shift per
/// weekday per requested class, using the template's default hours.
pub fn generate_changes_or_project(
    store: &dyn DomainStore,
    config: &Config,
    window: (DateTime<Utc>, DateTime<Utc>),
    team: TeamId,
    class: ShiftClass,
    force: bool,
    incidents_employee_by_week: &HashMap<(i32, u32), EmployeeId>,
) -> (Vec<ProposedShift>, Vec<Unassigned>, Vec<Conflict>) {
    let mut created = Vec::new();
    let mut unassigned = Vec::new();
    let mut conflicts = Vec::new();

    let template = match store.list_templates().into_iter().find(|t| t.class == class && t.active) {
        Some(t) => t,
        None => return (created, unassigned, conflicts),
    };

    let mut cursor = window.0.date_naive();
    let last = window.1.date_naive();
    while cursor < last {
        if !matches!(cursor.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            let start = Utc.from_utc_datetime(&cursor.and_time(template.default_start));
            let end = if template.default_end <= template.default_start {
                Utc.from_utc_datetime(&(cursor + Duration::days(1)).and_time(template.default_end))
            } else {
                Utc.from_utc_datetime(&cursor.and_time(template.default_end))
            };

            let already = already_generated(store, team, class, start, end);
            if !already {
                let iso = cursor.iso_week();
                let exclude: Vec<EmployeeId> = incidents_employee_by_week
                    .get(&(iso.year(), iso.week()))
                    .copied()
                    .into_iter()
                    .collect();
                let fairness_window =
                    FairnessWindow::rolling_year_containing(cursor, config.fairness_window_days);
                let candidates =
                    eligible_for_week(store, team, class, &[(start, end)], force, &exclude);

                let engine = FairnessEngine::new(store);
                match engine.select_employee(class, fairness_window, &candidates) {
                    None => unassigned.push((
                        cursor,
                        class,
                        "no eligible employee for the day".to_string(),
                    )),
                    Some(employee_id) => {
                        if force {
                            conflicts.extend(conflicts_for_assignment(store, employee_id, &[(start, end)]));
                        }
                        created.push(ProposedShift {
                            template_id: template.id,
                            employee_id,
                            class,
                            start,
                            end,
                            duration_hours: (end - start).num_seconds() as f64 / 3600.0,
                            auto_assigned: true,
                            reason: format!("{class} fill for {cursor}"),
                        })
                    }
                }
            }
        }
        cursor += Duration::days(1);
    }

    (created, unassigned, conflicts)
}
