//! End-to-end scenarios exercised against the in-memory store, one per
//! concrete example the scheduling behavior is specified against.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use watchkeeper::application::services::ConflictService;
use watchkeeper::application::use_cases::approval::{ApprovalWorkflowEngine, StepDecision, SwapSubmitOutcome};
use watchkeeper::application::use_cases::orchestrator::ShiftOrchestrator;
use watchkeeper::domain::capabilities::clock::FrozenClock;
use watchkeeper::domain::capabilities::escalation::NullEscalationResolver;
use watchkeeper::domain::capabilities::event_sink::{DomainEvent, EventSink};
use watchkeeper::domain::capabilities::{Permission, PermissionChecker};
use watchkeeper::domain::entities::{
    approval::{AutoApprovalPredicates, ManualApprovalSpec, SwapApprovalRule},
    Employee, LeaveRequest, ShiftTemplate, SwapRequest, Team,
};
use watchkeeper::domain::errors::CoreErrorKind;
use watchkeeper::domain::repositories::DomainStore;
use watchkeeper::domain::value_objects::{
    EmployeeId, LeaveRequestId, LeaveStatus, LeaveType, ShiftClass, ShiftTemplateId, SwapRequestId,
    SwapRuleId, SwapStatus, TeamId,
};
use watchkeeper::infrastructure::memory_store::InMemoryDomainStore;
use watchkeeper::Config;

struct AllowAll;
impl PermissionChecker for AllowAll {
    fn has(&self, _actor: EmployeeId, _permission: Permission) -> bool {
        true
    }
}

struct NullSink;
impl EventSink for NullSink {
    fn emit(&self, _event: DomainEvent, _recipient: EmployeeId, _occurred_at: DateTime<Utc>) {}
}

fn seed_rotation_team(store: &InMemoryDomainStore) -> TeamId {
    store.add_team(Team::new(TeamId(1), "T1")).unwrap();
    let mut e1 = Employee::new(EmployeeId(1), "E1", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    e1.team = Some(TeamId(1));
    let mut e2 = Employee::new(EmployeeId(2), "E2", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    e2.team = Some(TeamId(1));
    let mut e3 = Employee::new(EmployeeId(3), "E3", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    e3.team = Some(TeamId(1));
    e3.fte = 0.5;
    store.add_employee(e1).unwrap();
    store.add_employee(e2).unwrap();
    store.add_employee(e3).unwrap();

    store
        .add_template(ShiftTemplate::new(
            ShiftTemplateId(1),
            "Incidents",
            ShiftClass::Incidents,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        ))
        .unwrap();
    store
        .add_template(ShiftTemplate::new(
            ShiftTemplateId(2),
            "Waakdienst",
            ShiftClass::Waakdienst,
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        ))
        .unwrap();

    TeamId(1)
}

#[test]
fn scenario_1_preview_then_apply_incidents_and_waakdienst_week() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let permissions = AllowAll;
    let sink = NullSink;
    let team = seed_rotation_team(&store);

    let orchestrator = ShiftOrchestrator::new(&store, &config, &permissions, &sink);
    let window = (
        Utc.with_ymd_and_hms(2025, 10, 6, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 10, 13, 0, 0, 0).unwrap(),
    );
    let classes = [ShiftClass::Incidents, ShiftClass::Waakdienst];

    let preview = orchestrator.preview(window, &classes, team).unwrap();

    let incidents: Vec<_> = preview.created.iter().filter(|s| s.class == ShiftClass::Incidents).collect();
    assert_eq!(incidents.len(), 5);
    let incidents_employees: HashSet<_> = incidents.iter().map(|s| s.employee_id).collect();
    assert_eq!(incidents_employees.len(), 1);

    let waakdienst: Vec<_> = preview.created.iter().filter(|s| s.class == ShiftClass::Waakdienst).collect();
    assert_eq!(waakdienst.len(), 7);
    let waakdienst_employees: HashSet<_> = waakdienst.iter().map(|s| s.employee_id).collect();
    assert_eq!(waakdienst_employees.len(), 1);
    assert_ne!(incidents_employees, waakdienst_employees);

    orchestrator.apply(window, &classes, team, false, EmployeeId(1)).unwrap();

    let second_preview = orchestrator.preview(window, &classes, team).unwrap();
    assert!(second_preview.created.is_empty());
}

/// The waakdienst rotation boundary is Wednesday, not the calendar week's
/// Monday: one Employee holds the entire `[Wed 17:00, next Wed 08:00)`
/// span, including the Monday morning block left over once the weekend
/// ends, and the next rotation (starting the following Wednesday) is
/// free to hand off to someone else once the fairness ledger reflects
/// the first rotation's load.
#[test]
fn waakdienst_rotation_hands_off_at_the_wednesday_boundary() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let permissions = AllowAll;
    let sink = NullSink;
    let team = seed_rotation_team(&store);

    let orchestrator = ShiftOrchestrator::new(&store, &config, &permissions, &sink);
    let classes = [ShiftClass::Waakdienst];

    let first_period = (
        Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 10, 8, 8, 0, 0).unwrap(),
    );
    let first = orchestrator.apply(first_period, &classes, team, false, EmployeeId(1)).unwrap();
    assert_eq!(first.value.created.len(), 7);

    let first_shifts: Vec<_> = store.shifts(&watchkeeper::domain::repositories::ShiftQuery {
        employee: None,
        team: Some(team),
        window: Some(first_period),
        statuses: None,
    });
    let first_employees: HashSet<_> = first_shifts.iter().map(|s| s.employee_id).collect();
    assert_eq!(first_employees.len(), 1, "a single engineer must hold the whole rotation");
    let first_engineer = *first_employees.iter().next().unwrap();

    // The Monday morning gap block belongs to the rotation that started
    // the previous Wednesday, not to a fresh Monday-anchored selection.
    let monday_gap = store.shifts(&watchkeeper::domain::repositories::ShiftQuery {
        employee: None,
        team: Some(team),
        window: Some((
            Utc.with_ymd_and_hms(2025, 10, 6, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap(),
        )),
        statuses: None,
    });
    assert_eq!(monday_gap.len(), 1);
    assert_eq!(monday_gap[0].employee_id, first_engineer);

    let second_period = (
        Utc.with_ymd_and_hms(2025, 10, 8, 8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 10, 15, 8, 0, 0).unwrap(),
    );
    let second = orchestrator.apply(second_period, &classes, team, false, EmployeeId(1)).unwrap();
    assert_eq!(second.value.created.len(), 7);

    let second_shifts: Vec<_> = store.shifts(&watchkeeper::domain::repositories::ShiftQuery {
        employee: None,
        team: Some(team),
        window: Some(second_period),
        statuses: None,
    });
    let second_employees: HashSet<_> = second_shifts.iter().map(|s| s.employee_id).collect();
    assert_eq!(second_employees.len(), 1, "the second rotation is also held by a single engineer");
    let second_engineer = *second_employees.iter().next().unwrap();

    assert_ne!(
        first_engineer, second_engineer,
        "the fairness ledger must hand the next rotation to someone other than the engineer who just covered the first one"
    );
}

#[test]
fn scenario_2_auto_approved_swap() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let frozen_now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
    let clock = FrozenClock::new(frozen_now);
    let permissions = AllowAll;
    let escalation = NullEscalationResolver;
    let sink = NullSink;

    seed_rotation_team(&store);
    let requesting_shift = {
        store
            .apply_generated_shifts(vec![watchkeeper::domain::entities::Shift {
                id: watchkeeper::domain::value_objects::ShiftId(101),
                template_id: ShiftTemplateId(1),
                employee_id: EmployeeId(1),
                class: ShiftClass::Incidents,
                start: frozen_now + chrono::Duration::hours(48),
                end: frozen_now + chrono::Duration::hours(57),
                status: watchkeeper::domain::value_objects::ShiftStatus::Scheduled,
                notes: None,
                auto_assigned: false,
                reason: None,
            }])
            .unwrap()[0]
    };
    let target_shift = store
        .apply_generated_shifts(vec![watchkeeper::domain::entities::Shift {
            id: watchkeeper::domain::value_objects::ShiftId(102),
            template_id: ShiftTemplateId(1),
            employee_id: EmployeeId(2),
            class: ShiftClass::Incidents,
            start: frozen_now + chrono::Duration::hours(72),
            end: frozen_now + chrono::Duration::hours(81),
            status: watchkeeper::domain::value_objects::ShiftStatus::Scheduled,
            notes: None,
            auto_assigned: false,
            reason: None,
        }])
        .unwrap()[0];

    store
        .add_rule(SwapApprovalRule {
            id: SwapRuleId(1),
            priority: 5,
            active: true,
            applies_to: [ShiftClass::Incidents].into_iter().collect(),
            auto_approval_enabled: true,
            auto_approval: AutoApprovalPredicates {
                same_class_required: true,
                min_advance_hours: 24,
                min_seniority_months: 3,
                skills_match_required: false,
            },
            manual_approval: ManualApprovalSpec {
                manager_required: false,
                admin_required: false,
                levels_required: 1,
                delegation_allowed: false,
            },
            monthly_swap_cap: 5,
            notify: true,
        })
        .unwrap();

    let engine = ApprovalWorkflowEngine::new(&store, &config, &clock, &permissions, &escalation, &sink);
    let request = SwapRequest {
        id: SwapRequestId(0),
        requesting_employee: EmployeeId(1),
        target_employee: Some(EmployeeId(2)),
        requesting_shift,
        target_shift: Some(target_shift),
        reason: None,
        status: SwapStatus::Pending,
        version: 0,
    };

    let (swap_id, outcome) = engine.submit_swap(EmployeeId(1), request).unwrap();
    assert_eq!(outcome.value, SwapSubmitOutcome::AutoApproved);

    assert_eq!(store.get_shift(requesting_shift).unwrap().employee_id, EmployeeId(2));
    assert_eq!(store.get_shift(target_shift).unwrap().employee_id, EmployeeId(1));

    let audits = store.audits_for_request(swap_id);
    let actions: Vec<_> = audits.iter().map(|a| a.action).collect();
    assert!(actions.contains(&watchkeeper::domain::value_objects::AuditAction::Created));
    assert!(actions.contains(&watchkeeper::domain::value_objects::AuditAction::RuleApplied));
    assert!(actions.contains(&watchkeeper::domain::value_objects::AuditAction::AutoApproved));
}

#[test]
fn scenario_3_two_level_swap_with_delegation() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let frozen_now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
    let clock = FrozenClock::new(frozen_now);
    let permissions = AllowAll;
    let escalation = NullEscalationResolver;
    let sink = NullSink;

    seed_rotation_team(&store);
    let mut manager = Employee::new(EmployeeId(10), "M1", NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    manager.team = Some(TeamId(1));
    store.add_employee(manager).unwrap();
    let mut delegate = Employee::new(EmployeeId(11), "M1-prime", NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
    delegate.team = Some(TeamId(1));
    store.add_employee(delegate).unwrap();

    let mut team = store.get_team(TeamId(1)).unwrap();
    team.manager = Some(EmployeeId(10));
    store.add_team(team).unwrap();

    store
        .add_delegation(watchkeeper::domain::entities::ApprovalDelegation {
            id: watchkeeper::domain::value_objects::DelegationId(1),
            delegator: EmployeeId(10),
            delegate: EmployeeId(11),
            start_date: frozen_now.date_naive(),
            end_date: None,
            active: true,
            reason: None,
        })
        .unwrap();

    let requesting_shift = store
        .apply_generated_shifts(vec![watchkeeper::domain::entities::Shift {
            id: watchkeeper::domain::value_objects::ShiftId(201),
            template_id: ShiftTemplateId(1),
            employee_id: EmployeeId(1),
            class: ShiftClass::Incidents,
            start: frozen_now + chrono::Duration::hours(1),
            end: frozen_now + chrono::Duration::hours(10),
            status: watchkeeper::domain::value_objects::ShiftStatus::Scheduled,
            notes: None,
            auto_assigned: false,
            reason: None,
        }])
        .unwrap()[0];
    let target_shift = store
        .apply_generated_shifts(vec![watchkeeper::domain::entities::Shift {
            id: watchkeeper::domain::value_objects::ShiftId(202),
            template_id: ShiftTemplateId(1),
            employee_id: EmployeeId(2),
            class: ShiftClass::Incidents,
            start: frozen_now + chrono::Duration::hours(2),
            end: frozen_now + chrono::Duration::hours(11),
            status: watchkeeper::domain::value_objects::ShiftStatus::Scheduled,
            notes: None,
            auto_assigned: false,
            reason: None,
        }])
        .unwrap()[0];

    store
        .add_rule(SwapApprovalRule {
            id: SwapRuleId(1),
            priority: 5,
            active: true,
            applies_to: [ShiftClass::Incidents].into_iter().collect(),
            auto_approval_enabled: false,
            auto_approval: AutoApprovalPredicates {
                same_class_required: true,
                min_advance_hours: 0,
                min_seniority_months: 0,
                skills_match_required: false,
            },
            manual_approval: ManualApprovalSpec {
                manager_required: true,
                admin_required: true,
                levels_required: 2,
                delegation_allowed: true,
            },
            monthly_swap_cap: u32::MAX,
            notify: true,
        })
        .unwrap();

    let engine = ApprovalWorkflowEngine::new(&store, &config, &clock, &permissions, &escalation, &sink);
    let request = SwapRequest {
        id: SwapRequestId(0),
        requesting_employee: EmployeeId(1),
        target_employee: Some(EmployeeId(2)),
        requesting_shift,
        target_shift: Some(target_shift),
        reason: None,
        status: SwapStatus::Pending,
        version: 0,
    };
    let (swap_id, outcome) = engine.submit_swap(EmployeeId(1), request).unwrap();
    assert!(matches!(outcome.value, SwapSubmitOutcome::PendingApproval { .. }));

    let chain = store.chain_steps_for_request(swap_id);
    assert_eq!(chain.len(), 2);
    let step1 = chain.iter().find(|s| s.level == 1).unwrap();
    let step2 = chain.iter().find(|s| s.level == 2).unwrap();
    // level 1 is reassigned to the active delegate of the team manager.
    assert_eq!(step1.approver, EmployeeId(11));

    let blocked = engine.decide_swap_step(step2.approver, step2.id, StepDecision::Approve, None, None);
    assert!(matches!(
        blocked.unwrap_err().kind,
        CoreErrorKind::ConflictBlocking { .. }
    ));

    engine
        .decide_swap_step(EmployeeId(11), step1.id, StepDecision::Approve, None, None)
        .unwrap();
    engine
        .decide_swap_step(step2.approver, step2.id, StepDecision::Approve, None, None)
        .unwrap();

    assert_eq!(store.get_shift(requesting_shift).unwrap().employee_id, EmployeeId(2));
    assert_eq!(store.get_shift(target_shift).unwrap().employee_id, EmployeeId(1));
}

#[test]
fn scenario_4_blocking_personal_leave_overlap_and_alternatives() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let frozen_now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    let clock = FrozenClock::new(frozen_now);
    let permissions = AllowAll;
    let escalation = NullEscalationResolver;
    let sink = NullSink;

    store
        .add_employee(Employee::new(EmployeeId(1), "E1", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))
        .unwrap();
    store
        .add_leave_request(LeaveRequest {
            id: LeaveRequestId(1),
            employee_id: EmployeeId(1),
            leave_type: LeaveType::Vacation,
            start_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 27).unwrap(),
            requested_days: 8,
            status: LeaveStatus::Approved,
            decider: Some(EmployeeId(99)),
            decided_at: Some(frozen_now),
            reason: None,
            resolution_note: None,
            created_at: frozen_now,
            version: 0,
        })
        .unwrap();

    let conflict_service = ConflictService::new(&store, &config);
    let report = conflict_service.check_leave_conflicts(
        EmployeeId(1),
        NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 30).unwrap(),
        None,
    );
    assert!(!report.personal_overlaps.is_empty());
    assert!(report.is_blocking());

    let engine = ApprovalWorkflowEngine::new(&store, &config, &clock, &permissions, &escalation, &sink);
    let attempt = engine.submit_leave(
        EmployeeId(1),
        LeaveRequest {
            id: LeaveRequestId(0),
            employee_id: EmployeeId(1),
            leave_type: LeaveType::Vacation,
            start_date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 30).unwrap(),
            requested_days: 0,
            status: LeaveStatus::Pending,
            decider: None,
            decided_at: None,
            reason: None,
            resolution_note: None,
            created_at: frozen_now,
            version: 0,
        },
        None,
    );
    assert!(matches!(
        attempt.unwrap_err().kind,
        CoreErrorKind::ConflictBlocking { .. }
    ));

    let suggestions = conflict_service.suggest_alternative_leave_dates(
        EmployeeId(1),
        NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
        5,
        None,
    );
    assert_eq!(suggestions.len(), 5);
    for suggestion in &suggestions {
        let candidate_end = suggestion.candidate_start + chrono::Duration::days(4);
        assert!(!(suggestion.candidate_start <= NaiveDate::from_ymd_opt(2025, 12, 27).unwrap()
            && NaiveDate::from_ymd_opt(2025, 12, 20).unwrap() <= candidate_end));
    }
}

#[test]
fn scenario_5_competing_leave_conflict_resolution() {
    let store = InMemoryDomainStore::new();
    let config = Config::default();
    let frozen_now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let clock = FrozenClock::new(frozen_now);
    let permissions = AllowAll;
    let escalation = NullEscalationResolver;
    let sink = NullSink;

    let a = Employee::new(EmployeeId(10), "A", NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
    let b = Employee::new(EmployeeId(11), "B", NaiveDate::from_ymd_opt(2021, 1, 15).unwrap());
    let c = Employee::new(EmployeeId(12), "C", NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
    store.add_employee(a).unwrap();
    store.add_employee(b).unwrap();
    store.add_employee(c).unwrap();

    let start = NaiveDate::from_ymd_opt(2026, 5, 11).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 5, 13).unwrap();
    for (req_id, emp_id, minutes_after, used_ytd) in
        [(1u64, 10u64, 5i64, 4u32), (2, 11, 30, 1), (3, 12, 10, 8)]
    {
        store
            .add_leave_request(LeaveRequest {
                id: LeaveRequestId(req_id),
                employee_id: EmployeeId(emp_id),
                leave_type: LeaveType::Vacation,
                start_date: start,
                end_date: end,
                requested_days: 3,
                status: LeaveStatus::Pending,
                decider: None,
                decided_at: None,
                reason: None,
                resolution_note: None,
                created_at: frozen_now + chrono::Duration::minutes(minutes_after),
                version: 0,
            })
            .unwrap();
        if used_ytd > 0 {
            store
                .add_leave_request(LeaveRequest {
                    id: LeaveRequestId(req_id + 100),
                    employee_id: EmployeeId(emp_id),
                    leave_type: LeaveType::Vacation,
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                    end_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap() + chrono::Duration::days(used_ytd as i64 - 1),
                    requested_days: used_ytd,
                    status: LeaveStatus::Approved,
                    decider: Some(EmployeeId(99)),
                    decided_at: Some(frozen_now),
                    reason: None,
                    resolution_note: None,
                    created_at: frozen_now,
                    version: 0,
                })
                .unwrap();
        }
    }

    let engine = ApprovalWorkflowEngine::new(&store, &config, &clock, &permissions, &escalation, &sink);
    let recommendation = engine
        .recommend_leave_conflict_resolution(&[LeaveRequestId(1), LeaveRequestId(2), LeaveRequestId(3)])
        .unwrap();
    assert_eq!(recommendation.recommended, LeaveRequestId(1));
    assert_eq!(recommendation.votes, 2);
    assert_eq!(recommendation.seniority_pick, LeaveRequestId(1));
    assert_eq!(recommendation.first_submitted_pick, LeaveRequestId(1));
    assert_eq!(recommendation.least_used_pick, LeaveRequestId(2));

    engine
        .resolve_leave_conflict(
            EmployeeId(1),
            LeaveRequestId(1),
            vec![LeaveRequestId(2), LeaveRequestId(3)],
            "approved A per seniority+first-submitted vote".to_string(),
        )
        .unwrap();

    assert_eq!(store.get_leave_request(LeaveRequestId(1)).unwrap().status, LeaveStatus::Approved);
    assert_eq!(store.get_leave_request(LeaveRequestId(2)).unwrap().status, LeaveStatus::Rejected);
    assert_eq!(store.get_leave_request(LeaveRequestId(3)).unwrap().status, LeaveStatus::Rejected);
    assert!(store.get_leave_request(LeaveRequestId(2)).unwrap().resolution_note.is_some());
    assert!(store.get_leave_request(LeaveRequestId(3)).unwrap().resolution_note.is_some());
}

#[test]
fn scenario_6_recurring_pattern_idempotence_and_gap_fill() {
    use watchkeeper::application::use_cases::orchestrator::recurring::RecurringPatternGenerator;
    use watchkeeper::domain::entities::{RecurrenceKind, RecurringShiftPattern};
    use watchkeeper::domain::value_objects::PatternId;

    let store = InMemoryDomainStore::new();
    let config = Config::default();

    store
        .add_template(ShiftTemplate::new(
            ShiftTemplateId(1),
            "Changes",
            ShiftClass::Changes,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        ))
        .unwrap();

    let mut weekdays = HashSet::new();
    weekdays.insert(chrono::Weekday::Mon);
    weekdays.insert(chrono::Weekday::Wed);
    weekdays.insert(chrono::Weekday::Fri);

    let mut pattern = RecurringShiftPattern {
        id: PatternId(1),
        template_id: ShiftTemplateId(1),
        recurrence: RecurrenceKind::Weekly,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        weekdays,
        day_of_month: None,
        pattern_start: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        pattern_end: None,
        employee: Some(EmployeeId(1)),
        team: None,
        active: true,
        last_generated_through: None,
    };
    store.add_employee(Employee::new(EmployeeId(1), "E1", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())).unwrap();

    let generator = RecurringPatternGenerator::new(&store, &config);
    let horizon = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let first_run = generator.generate_pattern(&mut pattern, horizon).unwrap();
    assert_eq!(first_run.len(), 39);

    let mid_shift = store
        .shifts(&watchkeeper::domain::repositories::ShiftQuery::default())
        .into_iter()
        .find(|s| s.start.date_naive() == NaiveDate::from_ymd_opt(2025, 12, 3).unwrap())
        .unwrap();
    store.delete_shift(mid_shift.id).unwrap();

    // Re-running with the same horizon, cursor untouched: the generator
    // rescans the whole range and `already_covered` filters out every
    // date that still has a shift, so only the deleted date regenerates.
    let second_run = generator.generate_pattern(&mut pattern, horizon).unwrap();
    assert_eq!(second_run.len(), 1);
}
