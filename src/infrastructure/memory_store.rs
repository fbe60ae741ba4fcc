//! In-memory Domain Store.
//!
//! One `Mutex<HashMap<_, _>>` per aggregate. Suitable for tests and as a
//! reference implementation; a production deployment swaps this for a
//! real transactional engine behind the same `DomainStore` trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::domain::entities::{
    ApprovalDelegation, Department, Employee, LeaveRequest, NotificationEvent,
    NotificationPreference, RecurringShiftPattern, Shift, ShiftTemplate, SwapApprovalAudit,
    SwapApprovalChainStep, SwapApprovalRule, SwapRequest, Team,
};
use crate::domain::errors::{CoreError, CoreErrorKind, CoreResult, CorrelationId};
use crate::domain::repositories::store::{DomainStore, ShiftQuery};
use crate::domain::value_objects::{
    AuditId, ChainStepId, DelegationId, DepartmentId, EmployeeId, LeaveRequestId,
    LeaveStatus, NotificationId, PatternId, ShiftClass, ShiftId, ShiftStatus, ShiftTemplateId,
    SwapRequestId, SwapRuleId, SwapStatus, TeamId,
};

fn op_error(operation: &'static str, kind: CoreErrorKind) -> CoreError {
    CoreError::new(operation, CorrelationId::new(uuid_like()), kind)
}

/// Cheap, dependency-free stand-in for a UUID: a counter is sufficient
/// here because correlation ids only need to be unique per process for
/// joining an error to the audit rows/log lines it produced.
fn uuid_like() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("corr-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[derive(Default)]
pub struct InMemoryDomainStore {
    employees: Mutex<HashMap<EmployeeId, Employee>>,
    teams: Mutex<HashMap<TeamId, Team>>,
    departments: Mutex<HashMap<DepartmentId, Department>>,
    templates: Mutex<HashMap<ShiftTemplateId, ShiftTemplate>>,
    shifts: Mutex<HashMap<ShiftId, Shift>>,
    patterns: Mutex<HashMap<PatternId, RecurringShiftPattern>>,
    leave_requests: Mutex<HashMap<LeaveRequestId, LeaveRequest>>,
    swap_requests: Mutex<HashMap<SwapRequestId, SwapRequest>>,
    rules: Mutex<HashMap<SwapRuleId, SwapApprovalRule>>,
    chain_steps: Mutex<HashMap<ChainStepId, SwapApprovalChainStep>>,
    delegations: Mutex<HashMap<DelegationId, ApprovalDelegation>>,
    audit: Mutex<Vec<SwapApprovalAudit>>,
    notifications: Mutex<HashMap<NotificationId, NotificationEvent>>,
    preferences: Mutex<HashMap<EmployeeId, NotificationPreference>>,

    next_shift_id: AtomicU64,
    next_leave_id: AtomicU64,
    next_swap_id: AtomicU64,
    next_chain_step_id: AtomicU64,
    next_audit_id: AtomicU64,
    next_notification_id: AtomicU64,
    next_pattern_id: AtomicU64,
    next_delegation_id: AtomicU64,
}

impl InMemoryDomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn civil_dates_of(shift: &Shift) -> Vec<NaiveDate> {
        shift.civil_dates()
    }
}

impl DomainStore for InMemoryDomainStore {
    fn add_employee(&self, employee: Employee) -> CoreResult<()> {
        self.employees.lock().unwrap().insert(employee.id, employee);
        Ok(())
    }

    fn update_employee(&self, employee: Employee) -> CoreResult<()> {
        let mut guard = self.employees.lock().unwrap();
        if !guard.contains_key(&employee.id) {
            return Err(op_error(
                "update_employee",
                CoreErrorKind::NotFound {
                    entity: "Employee".into(),
                    id: employee.id.to_string(),
                },
            ));
        }
        guard.insert(employee.id, employee);
        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> Option<Employee> {
        self.employees.lock().unwrap().get(&id).cloned()
    }

    fn list_employees(&self) -> Vec<Employee> {
        self.employees.lock().unwrap().values().cloned().collect()
    }

    fn employees_in_team(&self, team: TeamId) -> Vec<Employee> {
        self.employees
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.team == Some(team))
            .cloned()
            .collect()
    }

    fn add_team(&self, team: Team) -> CoreResult<()> {
        self.teams.lock().unwrap().insert(team.id, team);
        Ok(())
    }

    fn get_team(&self, id: TeamId) -> Option<Team> {
        self.teams.lock().unwrap().get(&id).cloned()
    }

    fn list_teams(&self) -> Vec<Team> {
        self.teams.lock().unwrap().values().cloned().collect()
    }

    fn add_department(&self, department: Department) -> CoreResult<()> {
        self.departments
            .lock()
            .unwrap()
            .insert(department.id, department);
        Ok(())
    }

    fn get_department(&self, id: DepartmentId) -> Option<Department> {
        self.departments.lock().unwrap().get(&id).cloned()
    }

    fn add_template(&self, template: ShiftTemplate) -> CoreResult<()> {
        self.templates.lock().unwrap().insert(template.id, template);
        Ok(())
    }

    fn update_template(&self, template: ShiftTemplate) -> CoreResult<()> {
        let mut guard = self.templates.lock().unwrap();
        if !guard.contains_key(&template.id) {
            return Err(op_error(
                "update_template",
                CoreErrorKind::NotFound {
                    entity: "ShiftTemplate".into(),
                    id: template.id.to_string(),
                },
            ));
        }
        guard.insert(template.id, template);
        Ok(())
    }

    fn get_template(&self, id: ShiftTemplateId) -> Option<ShiftTemplate> {
        self.templates.lock().unwrap().get(&id).cloned()
    }

    fn list_templates(&self) -> Vec<ShiftTemplate> {
        self.templates.lock().unwrap().values().cloned().collect()
    }

    fn add_shift(&self, shift: Shift) -> CoreResult<ShiftId> {
        let id = shift.id;
        self.shifts.lock().unwrap().insert(id, shift);
        Ok(id)
    }

    fn update_shift(&self, shift: Shift) -> CoreResult<()> {
        let mut guard = self.shifts.lock().unwrap();
        if !guard.contains_key(&shift.id) {
            return Err(op_error(
                "update_shift",
                CoreErrorKind::NotFound {
                    entity: "Shift".into(),
                    id: shift.id.to_string(),
                },
            ));
        }
        guard.insert(shift.id, shift);
        Ok(())
    }

    fn delete_shift(&self, id: ShiftId) -> CoreResult<()> {
        let mut guard = self.shifts.lock().unwrap();
        match guard.get(&id) {
            None => Err(op_error(
                "delete_shift",
                CoreErrorKind::NotFound {
                    entity: "Shift".into(),
                    id: id.to_string(),
                },
            )),
            Some(s) if s.status == ShiftStatus::Completed => Err(op_error(
                "delete_shift",
                CoreErrorKind::ConflictBlocking {
                    reason: "cannot delete a completed shift".into(),
                    conflicts: Vec::new(),
                },
            )),
            Some(_) => {
                guard.remove(&id);
                Ok(())
            }
        }
    }

    fn get_shift(&self, id: ShiftId) -> Option<Shift> {
        self.shifts.lock().unwrap().get(&id).cloned()
    }

    fn shifts(&self, query: &ShiftQuery) -> Vec<Shift> {
        let employees_by_team: Option<std::collections::HashSet<EmployeeId>> =
            query.team.map(|t| {
                self.employees_in_team(t)
                    .into_iter()
                    .map(|e| e.id)
                    .collect()
            });
        self.shifts
            .lock()
            .unwrap()
            .values()
            .filter(|s| query.employee.map(|e| e == s.employee_id).unwrap_or(true))
            .filter(|s| {
                employees_by_team
                    .as_ref()
                    .map(|set| set.contains(&s.employee_id))
                    .unwrap_or(true)
            })
            .filter(|s| {
                query
                    .window
                    .map(|(t1, t2)| s.start < t2 && t1 < s.end)
                    .unwrap_or(true)
            })
            .filter(|s| {
                query
                    .statuses
                    .as_ref()
                    .map(|statuses| statuses.contains(&s.status))
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    fn overlapping_shifts(
        &self,
        employee: EmployeeId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ShiftId>,
    ) -> Vec<Shift> {
        self.shifts
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == employee)
            .filter(|s| !s.status.is_cancelled())
            .filter(|s| exclude.map(|ex| ex != s.id).unwrap_or(true))
            .filter(|s| s.overlaps(start, end))
            .cloned()
            .collect()
    }

    fn hours_for_day(&self, employee: EmployeeId, date: NaiveDate) -> f64 {
        self.shifts
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == employee && !s.status.is_cancelled())
            .filter(|s| Self::civil_dates_of(s).contains(&date))
            .map(|s| s.duration_hours())
            .sum()
    }

    fn hours_for_iso_week(&self, employee: EmployeeId, iso_year: i32, iso_week: u32) -> f64 {
        self.shifts
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == employee && !s.status.is_cancelled())
            .filter(|s| {
                let iso = s.start.date_naive().iso_week();
                iso.year() == iso_year && iso.week() == iso_week
            })
            .map(|s| s.duration_hours())
            .sum()
    }

    fn hours_for_month(&self, employee: EmployeeId, year: i32, month: u32) -> f64 {
        self.shifts
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == employee && !s.status.is_cancelled())
            .filter(|s| s.start.year() == year && s.start.month() == month)
            .map(|s| s.duration_hours())
            .sum()
    }

    fn assigned_class_days(
        &self,
        employee: EmployeeId,
        class: ShiftClass,
        start: NaiveDate,
        end: NaiveDate,
    ) -> u32 {
        use std::collections::HashSet;
        let mut days: HashSet<NaiveDate> = HashSet::new();
        for shift in self.shifts.lock().unwrap().values() {
            if shift.employee_id != employee || shift.class != class || shift.status.is_cancelled()
            {
                continue;
            }
            for date in Self::civil_dates_of(shift) {
                if date < start || date > end {
                    continue;
                }
                let counts = match class {
                    ShiftClass::Incidents | ShiftClass::Changes => {
                        !matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
                    }
                    ShiftClass::Waakdienst | ShiftClass::Project => true,
                };
                if counts {
                    days.insert(date);
                }
            }
        }
        days.len() as u32
    }

    fn apply_generated_shifts(&self, shifts: Vec<Shift>) -> CoreResult<Vec<ShiftId>> {
        let mut guard = self.shifts.lock().unwrap();
        let ids: Vec<ShiftId> = shifts.iter().map(|s| s.id).collect();
        for shift in shifts {
            guard.insert(shift.id, shift);
        }
        Ok(ids)
    }

    fn add_pattern(&self, pattern: RecurringShiftPattern) -> CoreResult<()> {
        self.patterns.lock().unwrap().insert(pattern.id, pattern);
        Ok(())
    }

    fn update_pattern(&self, pattern: RecurringShiftPattern) -> CoreResult<()> {
        self.patterns.lock().unwrap().insert(pattern.id, pattern);
        Ok(())
    }

    fn get_pattern(&self, id: PatternId) -> Option<RecurringShiftPattern> {
        self.patterns.lock().unwrap().get(&id).cloned()
    }

    fn list_patterns(&self) -> Vec<RecurringShiftPattern> {
        self.patterns.lock().unwrap().values().cloned().collect()
    }

    fn add_leave_request(&self, request: LeaveRequest) -> CoreResult<()> {
        self.leave_requests
            .lock()
            .unwrap()
            .insert(request.id, request);
        Ok(())
    }

    fn update_leave_request(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> CoreResult<()> {
        let mut guard = self.leave_requests.lock().unwrap();
        match guard.get(&request.id) {
            None => Err(op_error(
                "update_leave_request",
                CoreErrorKind::NotFound {
                    entity: "LeaveRequest".into(),
                    id: request.id.to_string(),
                },
            )),
            Some(existing) if existing.version != expected_version => Err(op_error(
                "update_leave_request",
                CoreErrorKind::StaleState {
                    entity: "LeaveRequest".into(),
                    id: request.id.to_string(),
                },
            )),
            Some(_) => {
                guard.insert(request.id, request);
                Ok(())
            }
        }
    }

    fn get_leave_request(&self, id: LeaveRequestId) -> Option<LeaveRequest> {
        self.leave_requests.lock().unwrap().get(&id).cloned()
    }

    fn leave_requests_for_employee(&self, employee: EmployeeId) -> Vec<LeaveRequest> {
        self.leave_requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.employee_id == employee)
            .cloned()
            .collect()
    }

    fn leave_requests_overlapping(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<LeaveRequest> {
        self.leave_requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.employee_id == employee && r.is_non_rejected())
            .filter(|r| r.intersects(start, end))
            .cloned()
            .collect()
    }

    fn approved_leave_on_date(&self, team: TeamId, date: NaiveDate) -> Vec<EmployeeId> {
        let team_employees: std::collections::HashSet<EmployeeId> = self
            .employees_in_team(team)
            .into_iter()
            .map(|e| e.id)
            .collect();
        self.leave_requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == LeaveStatus::Approved)
            .filter(|r| team_employees.contains(&r.employee_id))
            .filter(|r| r.intersects(date, date))
            .map(|r| r.employee_id)
            .collect()
    }

    fn pending_leave_requests(&self, team: Option<TeamId>) -> Vec<LeaveRequest> {
        let team_employees: Option<std::collections::HashSet<EmployeeId>> = team.map(|t| {
            self.employees_in_team(t)
                .into_iter()
                .map(|e| e.id)
                .collect()
        });
        self.leave_requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == LeaveStatus::Pending)
            .filter(|r| {
                team_employees
                    .as_ref()
                    .map(|set| set.contains(&r.employee_id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    fn resolve_leave_conflict_set(
        &self,
        approve: LeaveRequestId,
        reject: Vec<LeaveRequestId>,
        decider: EmployeeId,
        decided_at: DateTime<Utc>,
        resolution_note: String,
    ) -> CoreResult<()> {
        let mut guard = self.leave_requests.lock().unwrap();
        if !guard.contains_key(&approve) || reject.iter().any(|id| !guard.contains_key(id)) {
            return Err(op_error(
                "resolve_leave_conflict_set",
                CoreErrorKind::NotFound {
                    entity: "LeaveRequest".into(),
                    id: approve.to_string(),
                },
            ));
        }
        if let Some(r) = guard.get_mut(&approve) {
            r.status = LeaveStatus::Approved;
            r.decider = Some(decider);
            r.decided_at = Some(decided_at);
            r.resolution_note = Some(resolution_note.clone());
            r.version += 1;
        }
        for id in reject {
            if let Some(r) = guard.get_mut(&id) {
                r.status = LeaveStatus::Rejected;
                r.decider = Some(decider);
                r.decided_at = Some(decided_at);
                r.resolution_note = Some(resolution_note.clone());
                r.version += 1;
            }
        }
        Ok(())
    }

    fn add_swap_request(&self, request: SwapRequest) -> CoreResult<()> {
        self.swap_requests
            .lock()
            .unwrap()
            .insert(request.id, request);
        Ok(())
    }

    fn update_swap_request(
        &self,
        request: SwapRequest,
        expected_version: u64,
    ) -> CoreResult<()> {
        let mut guard = self.swap_requests.lock().unwrap();
        match guard.get(&request.id) {
            None => Err(op_error(
                "update_swap_request",
                CoreErrorKind::NotFound {
                    entity: "SwapRequest".into(),
                    id: request.id.to_string(),
                },
            )),
            Some(existing) if existing.version != expected_version => Err(op_error(
                "update_swap_request",
                CoreErrorKind::StaleState {
                    entity: "SwapRequest".into(),
                    id: request.id.to_string(),
                },
            )),
            Some(_) => {
                guard.insert(request.id, request);
                Ok(())
            }
        }
    }

    fn get_swap_request(&self, id: SwapRequestId) -> Option<SwapRequest> {
        self.swap_requests.lock().unwrap().get(&id).cloned()
    }

    fn approved_swaps_this_month(&self, employee: EmployeeId, year: i32, month: u32) -> u32 {
        let swaps = self.swap_requests.lock().unwrap();
        let audits = self.audit.lock().unwrap();
        swaps
            .values()
            .filter(|s| s.requesting_employee == employee && s.status == SwapStatus::Approved)
            .filter(|s| {
                audits.iter().any(|a| {
                    a.swap_request == s.id
                        && matches!(
                            a.action,
                            crate::domain::value_objects::AuditAction::Approved
                                | crate::domain::value_objects::AuditAction::AutoApproved
                        )
                        && a.created_at.year() == year
                        && a.created_at.month() == month
                })
            })
            .count() as u32
    }

    fn execute_swap(&self, swap: SwapRequestId, audit: SwapApprovalAudit) -> CoreResult<()> {
        let mut shifts = self.shifts.lock().unwrap();
        let mut swaps = self.swap_requests.lock().unwrap();
        let mut audit_log = self.audit.lock().unwrap();

        let request = swaps.get(&swap).cloned().ok_or_else(|| {
            op_error(
                "execute_swap",
                CoreErrorKind::NotFound {
                    entity: "SwapRequest".into(),
                    id: swap.to_string(),
                },
            )
        })?;

        let requesting = shifts.get(&request.requesting_shift).cloned().ok_or_else(|| {
            op_error(
                "execute_swap",
                CoreErrorKind::NotFound {
                    entity: "Shift".into(),
                    id: request.requesting_shift.to_string(),
                },
            )
        })?;
        if requesting.status.blocks_swap() {
            return Err(op_error(
                "execute_swap",
                CoreErrorKind::ConflictBlocking {
                    reason: "requesting shift is in_progress, completed, or cancelled".into(),
                    conflicts: Vec::new(),
                },
            ));
        }

        if let Some(target_id) = request.target_shift {
            let target = shifts.get(&target_id).cloned().ok_or_else(|| {
                op_error(
                    "execute_swap",
                    CoreErrorKind::NotFound {
                        entity: "Shift".into(),
                        id: target_id.to_string(),
                    },
                )
            })?;
            if target.status.blocks_swap() {
                return Err(op_error(
                    "execute_swap",
                    CoreErrorKind::ConflictBlocking {
                        reason: "target shift is in_progress, completed, or cancelled".into(),
                        conflicts: Vec::new(),
                    },
                ));
            }
            let mut req_mut = requesting.clone();
            let mut tgt_mut = target.clone();
            req_mut.employee_id = target.employee_id;
            tgt_mut.employee_id = requesting.employee_id;
            shifts.insert(req_mut.id, req_mut);
            shifts.insert(tgt_mut.id, tgt_mut);
        } else if let Some(target_employee) = request.target_employee {
            let mut req_mut = requesting.clone();
            req_mut.employee_id = target_employee;
            shifts.insert(req_mut.id, req_mut);
        }

        let mut request = request;
        request.status = SwapStatus::Approved;
        request.version += 1;
        swaps.insert(request.id, request);
        audit_log.push(audit);
        Ok(())
    }

    fn add_rule(&self, rule: SwapApprovalRule) -> CoreResult<()> {
        self.rules.lock().unwrap().insert(rule.id, rule);
        Ok(())
    }

    fn get_rule(&self, id: SwapRuleId) -> Option<SwapApprovalRule> {
        self.rules.lock().unwrap().get(&id).cloned()
    }

    fn active_rules_for_class(&self, class: ShiftClass) -> Vec<SwapApprovalRule> {
        self.rules
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.active && r.applies_to.contains(&class))
            .cloned()
            .collect()
    }

    fn add_chain_step(&self, step: SwapApprovalChainStep) -> CoreResult<()> {
        let mut guard = self.chain_steps.lock().unwrap();
        if guard
            .values()
            .any(|s| s.swap_request == step.swap_request && s.level == step.level)
        {
            return Err(op_error(
                "add_chain_step",
                CoreErrorKind::ConflictBlocking {
                    reason: format!(
                        "chain level {} already exists for swap request {}",
                        step.level, step.swap_request
                    ),
                    conflicts: Vec::new(),
                },
            ));
        }
        guard.insert(step.id, step);
        Ok(())
    }

    fn update_chain_step(&self, step: SwapApprovalChainStep) -> CoreResult<()> {
        self.chain_steps.lock().unwrap().insert(step.id, step);
        Ok(())
    }

    fn get_chain_step(&self, id: ChainStepId) -> Option<SwapApprovalChainStep> {
        self.chain_steps.lock().unwrap().get(&id).cloned()
    }

    fn chain_steps_for_request(&self, swap: SwapRequestId) -> Vec<SwapApprovalChainStep> {
        let mut steps: Vec<SwapApprovalChainStep> = self
            .chain_steps
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.swap_request == swap)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.level);
        steps
    }

    fn pending_chain_steps_for(&self, approver: EmployeeId) -> Vec<SwapApprovalChainStep> {
        self.chain_steps
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.approver == approver)
            .filter(|s| s.status == crate::domain::value_objects::ChainStepStatus::Pending)
            .cloned()
            .collect()
    }

    fn all_pending_chain_steps(&self) -> Vec<SwapApprovalChainStep> {
        self.chain_steps
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.status == crate::domain::value_objects::ChainStepStatus::Pending)
            .cloned()
            .collect()
    }

    fn add_delegation(&self, delegation: ApprovalDelegation) -> CoreResult<()> {
        self.delegations
            .lock()
            .unwrap()
            .insert(delegation.id, delegation);
        Ok(())
    }

    fn get_delegation(&self, id: DelegationId) -> Option<ApprovalDelegation> {
        self.delegations.lock().unwrap().get(&id).cloned()
    }

    fn active_delegations_for(
        &self,
        delegator: EmployeeId,
        today: NaiveDate,
    ) -> Vec<ApprovalDelegation> {
        self.delegations
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.delegator == delegator && d.is_currently_active(today))
            .cloned()
            .collect()
    }

    fn append_audit(&self, audit: SwapApprovalAudit) -> CoreResult<()> {
        self.audit.lock().unwrap().push(audit);
        Ok(())
    }

    fn audits_for_request(&self, swap: SwapRequestId) -> Vec<SwapApprovalAudit> {
        let mut rows: Vec<SwapApprovalAudit> = self
            .audit
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.swap_request == swap)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.created_at);
        rows
    }

    fn add_notification(&self, notification: NotificationEvent) -> CoreResult<()> {
        self.notifications
            .lock()
            .unwrap()
            .insert(notification.id, notification);
        Ok(())
    }

    fn notifications_for(&self, recipient: EmployeeId) -> Vec<NotificationEvent> {
        self.notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }

    fn get_preference(&self, employee: EmployeeId) -> NotificationPreference {
        self.preferences
            .lock()
            .unwrap()
            .get(&employee)
            .cloned()
            .unwrap_or_else(|| NotificationPreference::default_for(employee))
    }

    fn set_preference(&self, preference: NotificationPreference) -> CoreResult<()> {
        self.preferences
            .lock()
            .unwrap()
            .insert(preference.employee_id, preference);
        Ok(())
    }

    fn next_shift_id(&self) -> ShiftId {
        ShiftId(self.next_shift_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_leave_request_id(&self) -> LeaveRequestId {
        LeaveRequestId(self.next_leave_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_swap_request_id(&self) -> SwapRequestId {
        SwapRequestId(self.next_swap_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_chain_step_id(&self) -> ChainStepId {
        ChainStepId(self.next_chain_step_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_audit_id(&self) -> AuditId {
        AuditId(self.next_audit_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_notification_id(&self) -> NotificationId {
        NotificationId(self.next_notification_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_pattern_id(&self) -> PatternId {
        PatternId(self.next_pattern_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_delegation_id(&self) -> DelegationId {
        DelegationId(self.next_delegation_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn employee(id: u64) -> Employee {
        Employee::new(EmployeeId(id), format!("E{id}"), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    }

    #[test]
    fn add_and_get_employee_roundtrips() {
        let store = InMemoryDomainStore::new();
        store.add_employee(employee(1)).unwrap();
        assert_eq!(store.get_employee(EmployeeId(1)).unwrap().display_name, "E1");
    }

    #[test]
    fn update_leave_request_rejects_stale_version() {
        let store = InMemoryDomainStore::new();
        let id = store.next_leave_request_id();
        let request = LeaveRequest {
            id,
            employee_id: EmployeeId(1),
            leave_type: crate::domain::value_objects::LeaveType::Vacation,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            requested_days: 2,
            status: LeaveStatus::Pending,
            decider: None,
            decided_at: None,
            reason: None,
            resolution_note: None,
            created_at: Utc::now(),
            version: 0,
        };
        store.add_leave_request(request.clone()).unwrap();
        let err = store.update_leave_request(request, 5).unwrap_err();
        assert!(matches!(err.kind, CoreErrorKind::StaleState { .. }));
    }

    #[test]
    fn chain_step_level_uniqueness_enforced() {
        let store = InMemoryDomainStore::new();
        let swap = SwapRequestId(1);
        let step = SwapApprovalChainStep {
            id: store.next_chain_step_id(),
            swap_request: swap,
            level: 1,
            approver: EmployeeId(1),
            status: crate::domain::value_objects::ChainStepStatus::Pending,
            decided_at: None,
            notes: None,
            delegated_to: None,
            originating_rule: SwapRuleId(0),
        };
        store.add_chain_step(step.clone()).unwrap();
        let dup = SwapApprovalChainStep {
            id: store.next_chain_step_id(),
            ..step
        };
        assert!(store.add_chain_step(dup).is_err());
    }

    #[test]
    fn delete_shift_refuses_completed() {
        let store = InMemoryDomainStore::new();
        let id = store.next_shift_id();
        let shift = Shift {
            id,
            template_id: ShiftTemplateId(1),
            employee_id: EmployeeId(1),
            class: ShiftClass::Incidents,
            start: Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 10, 6, 17, 0, 0).unwrap(),
            status: ShiftStatus::Completed,
            notes: None,
            auto_assigned: true,
            reason: None,
        };
        store.add_shift(shift).unwrap();
        assert!(store.delete_shift(id).is_err());
    }
}
