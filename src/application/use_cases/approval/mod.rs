//! Approval Workflow Engine.
//!
//! Drives both shift-swap and leave approval through a single engine:
//! rule matching, ordered auto-approval evaluation, multi-level chain
//! construction with delegation substitution, decision processing, and
//! an audit trail. The Domain Store's `execute_swap` and
//! `resolve_leave_conflict_set` supply the atomic composite writes;
//! this module never mutates two entities outside of one such call.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::services::ConflictService;
use crate::domain::capabilities::{
    Clock, EscalationResolver, EventSink, Permission, PermissionChecker,
};
use crate::domain::capabilities::event_sink::DomainEvent;
use crate::domain::entities::{
    ApprovalDelegation, LeaveRequest, SwapApprovalAudit, SwapApprovalChainStep, SwapApprovalRule,
    SwapRequest,
};
use crate::domain::errors::{CoreError, CoreErrorKind, CoreResult, CorrelationId, Outcome};
use crate::domain::repositories::DomainStore;
use crate::domain::value_objects::{
    AuditAction, ChainStepId, ChainStepStatus, Conflict, DelegationId, EmployeeId,
    LeaveRequestId, LeaveStatus, ShiftClass, ShiftStatus, SwapRequestId, SwapRuleId, SwapStatus,
    TeamId,
};
use crate::Config;

const OP_SUBMIT_SWAP: &str = "approval.submit_swap";
const OP_DECIDE_SWAP: &str = "approval.decide_swap_step";
const OP_SUBMIT_LEAVE: &str = "approval.submit_leave";
const OP_DECIDE_LEAVE: &str = "approval.decide_leave";
const OP_RESOLVE_CONFLICT: &str = "approval.resolve_leave_conflict";
const OP_CREATE_DELEGATION: &str = "approval.create_delegation";

/// Outcome of `submit_swap`: either the swap executed immediately, or a
/// chain is now pending with the named first-level approvers notified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SwapSubmitOutcome {
    AutoApproved,
    PendingApproval { first_level_approvers: Vec<EmployeeId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDecision {
    Approve,
    Reject,
    Delegate,
}

/// Vote tally behind `recommend_leave_conflict_resolution`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictRecommendation {
    pub recommended: LeaveRequestId,
    pub votes: u32,
    pub seniority_pick: LeaveRequestId,
    pub first_submitted_pick: LeaveRequestId,
    pub least_used_pick: LeaveRequestId,
}

pub struct ApprovalWorkflowEngine<'a> {
    store: &'a dyn DomainStore,
    config: &'a Config,
    clock: &'a dyn Clock,
    permissions: &'a dyn PermissionChecker,
    escalation: &'a dyn EscalationResolver,
    event_sink: &'a dyn EventSink,
}

impl<'a> ApprovalWorkflowEngine<'a> {
    pub fn new(
        store: &'a dyn DomainStore,
        config: &'a Config,
        clock: &'a dyn Clock,
        permissions: &'a dyn PermissionChecker,
        escalation: &'a dyn EscalationResolver,
        event_sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            permissions,
            escalation,
            event_sink,
        }
    }

    fn correlation(op: &'static str, key: impl std::fmt::Display) -> CorrelationId {
        CorrelationId::new(format!("{op}-{key}"))
    }

    fn require(&self, actor: EmployeeId, permission: Permission, op: &'static str) -> CoreResult<()> {
        if self.permissions.has(actor, permission) {
            Ok(())
        } else {
            Err(CoreError::permission_denied(
                op,
                Self::correlation(op, actor),
                permission.key(),
            ))
        }
    }

    fn matching_rule(&self, class: ShiftClass) -> SwapApprovalRule {
        self.store
            .active_rules_for_class(class)
            .into_iter()
            .filter(|r| r.active)
            .max_by_key(|r| r.priority)
            .unwrap_or_else(SwapApprovalRule::system_default)
    }

    fn append_audit(
        &self,
        swap: SwapRequestId,
        action: AuditAction,
        actor: Option<EmployeeId>,
        chain_step: Option<ChainStepId>,
        rule: Option<SwapRuleId>,
        notes: Option<String>,
        metadata: serde_json::Value,
    ) -> CoreResult<()> {
        self.store.append_audit(SwapApprovalAudit {
            id: self.store.next_audit_id(),
            swap_request: swap,
            action,
            actor,
            chain_step,
            rule,
            notes,
            metadata,
            created_at: self.clock.now(),
        })
    }

    /// Ordered auto-approval predicate evaluation; short-circuits on the
    /// first failing predicate.
    fn passes_auto_approval(&self, rule: &SwapApprovalRule, swap: &SwapRequest) -> bool {
        if !rule.auto_approval_enabled {
            return false;
        }
        let requesting_shift = match self.store.get_shift(swap.requesting_shift) {
            Some(s) => s,
            None => return false,
        };
        let target_shift = match swap.target_shift.and_then(|id| self.store.get_shift(id)) {
            Some(s) => s,
            None if swap.is_one_way() => requesting_shift.clone(),
            None => return false,
        };

        if requesting_shift.status.blocks_swap() || target_shift.status.blocks_swap() {
            return false;
        }

        // a. same-class required
        if rule.auto_approval.same_class_required && requesting_shift.class != target_shift.class {
            return false;
        }

        // b. min-advance-hours
        let advance_hours = (requesting_shift.start - self.clock.now()).num_seconds() as f64 / 3600.0;
        if advance_hours < rule.auto_approval.min_advance_hours as f64 {
            return false;
        }

        // c. min-seniority-months
        let requester = match self.store.get_employee(swap.requesting_employee) {
            Some(e) => e,
            None => return false,
        };
        if requester.tenure_months(self.clock.today()) < rule.auto_approval.min_seniority_months {
            return false;
        }

        // d. skills-match required
        if rule.auto_approval.skills_match_required {
            let requesting_template = self.store.get_template(requesting_shift.template_id);
            let target_template = self.store.get_template(target_shift.template_id);
            let target_employee = swap
                .target_employee
                .and_then(|id| self.store.get_employee(id));
            match (requesting_template, target_template, target_employee) {
                (Some(rt), Some(tt), Some(target_emp)) => {
                    if !requester.has_skills(&tt.required_skills)
                        || !target_emp.has_skills(&rt.required_skills)
                    {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        // e. monthly cap
        let now = self.clock.today();
        let approved_this_month =
            self.store
                .approved_swaps_this_month(swap.requesting_employee, now.year(), now.month());
        if approved_this_month >= rule.monthly_swap_cap {
            return false;
        }

        true
    }

    /// Level-1 approver is always the target Employee's Team manager.
    /// Levels beyond that go through the injected `EscalationResolver`,
    /// falling back to the previous level's approver when the
    /// organization has no holder configured for a level.
    fn resolve_chain_approvers(&self, target_employee: EmployeeId, levels: u8) -> Vec<EmployeeId> {
        let manager = self
            .store
            .get_employee(target_employee)
            .and_then(|e| e.team)
            .and_then(|team_id| self.store.get_team(team_id))
            .and_then(|team| team.manager)
            .unwrap_or(target_employee);

        let mut approvers = vec![manager];
        for level in 2..=levels {
            let next = self
                .escalation
                .resolve(target_employee, level)
                .unwrap_or_else(|| *approvers.last().unwrap());
            approvers.push(next);
        }
        approvers
    }

    fn active_delegate_of(&self, approver: EmployeeId) -> Option<EmployeeId> {
        self.store
            .active_delegations_for(approver, self.clock.today())
            .into_iter()
            .map(|d| d.delegate)
            .next()
    }

    /// Entry point for shift-swap submission.
    pub fn submit_swap(
        &self,
        actor: EmployeeId,
        mut request: SwapRequest,
    ) -> CoreResult<(SwapRequestId, Outcome<SwapSubmitOutcome>)> {
        self.require(actor, Permission::RequestSwap, OP_SUBMIT_SWAP)?;

        let requesting_shift = self.store.get_shift(request.requesting_shift).ok_or_else(|| {
            CoreError::not_found(
                OP_SUBMIT_SWAP,
                Self::correlation(OP_SUBMIT_SWAP, actor),
                "shift",
                request.requesting_shift.to_string(),
            )
        })?;
        if requesting_shift.status.blocks_swap() {
            return Err(CoreError::blocking(
                OP_SUBMIT_SWAP,
                Self::correlation(OP_SUBMIT_SWAP, actor),
                "requesting shift is not open to swap",
                Vec::new(),
            ));
        }
        if let Some(target_shift) = request.target_shift.and_then(|id| self.store.get_shift(id)) {
            if target_shift.status.blocks_swap() {
                return Err(CoreError::blocking(
                    OP_SUBMIT_SWAP,
                    Self::correlation(OP_SUBMIT_SWAP, actor),
                    "target shift is not open to swap",
                    Vec::new(),
                ));
            }
        }

        request.id = self.store.next_swap_request_id();
        request.status = SwapStatus::Pending;
        request.version = 0;
        let swap_id = request.id;
        self.store.add_swap_request(request.clone())?;

        self.append_audit(
            swap_id,
            AuditAction::Created,
            Some(actor),
            None,
            None,
            None,
            json!({"requesting_shift": requesting_shift.id.to_string()}),
        )?;
        self.event_sink.emit(
            DomainEvent::SwapSubmitted {
                swap_request: swap_id,
                requesting_employee: request.requesting_employee,
            },
            request.requesting_employee,
            self.clock.now(),
        );

        let rule = self.matching_rule(requesting_shift.class);

        self.append_audit(
            swap_id,
            AuditAction::RuleApplied,
            None,
            None,
            Some(rule.id),
            None,
            json!({"priority": rule.priority}),
        )?;

        if self.passes_auto_approval(&rule, &request) {
            let audit = SwapApprovalAudit {
                id: self.store.next_audit_id(),
                swap_request: swap_id,
                action: AuditAction::AutoApproved,
                actor: None,
                chain_step: None,
                rule: Some(rule.id),
                notes: None,
                metadata: json!({}),
                created_at: self.clock.now(),
            };
            self.store.execute_swap(swap_id, audit)?;

            self.event_sink.emit(
                DomainEvent::SwapDecided {
                    swap_request: swap_id,
                    approved: true,
                },
                request.requesting_employee,
                self.clock.now(),
            );
            if let Some(target_employee) = request.target_employee {
                self.event_sink.emit(
                    DomainEvent::SwapDecided {
                        swap_request: swap_id,
                        approved: true,
                    },
                    target_employee,
                    self.clock.now(),
                );
            }

            return Ok((swap_id, Outcome::clean(SwapSubmitOutcome::AutoApproved)));
        }

        let target_employee = request.target_employee.unwrap_or(request.requesting_employee);
        let levels = rule.manual_approval.levels_required.max(1);
        let approvers = self.resolve_chain_approvers(target_employee, levels);

        let mut first_level_approvers = Vec::new();
        for (idx, approver) in approvers.iter().enumerate() {
            let level = (idx + 1) as u8;
            let (effective_approver, delegated_from) = match self.active_delegate_of(*approver) {
                Some(delegate) => (delegate, Some(*approver)),
                None => (*approver, None),
            };

            let step_id = self.store.next_chain_step_id();
            self.store.add_chain_step(SwapApprovalChainStep {
                id: step_id,
                swap_request: swap_id,
                level,
                approver: effective_approver,
                status: ChainStepStatus::Pending,
                decided_at: None,
                notes: None,
                delegated_to: None,
                originating_rule: rule.id,
            })?;

            if let Some(original) = delegated_from {
                self.append_audit(
                    swap_id,
                    AuditAction::Delegated,
                    None,
                    Some(step_id),
                    Some(rule.id),
                    Some(format!("delegated from {original} to {effective_approver}")),
                    json!({"level": level}),
                )?;
            }

            if level == 1 {
                first_level_approvers.push(effective_approver);
            }
        }

        for approver in &first_level_approvers {
            self.event_sink.emit(
                DomainEvent::SwapChainStepPending {
                    swap_request: swap_id,
                    approver: *approver,
                },
                *approver,
                self.clock.now(),
            );
        }

        Ok((
            swap_id,
            Outcome::clean(SwapSubmitOutcome::PendingApproval { first_level_approvers }),
        ))
    }

    /// Decision processing for a single chain step.
    pub fn decide_swap_step(
        &self,
        actor: EmployeeId,
        step_id: ChainStepId,
        decision: StepDecision,
        notes: Option<String>,
        delegate_to: Option<EmployeeId>,
    ) -> CoreResult<Outcome<()>> {
        let corr = Self::correlation(OP_DECIDE_SWAP, actor);
        let mut step = self
            .store
            .get_chain_step(step_id)
            .ok_or_else(|| CoreError::not_found(OP_DECIDE_SWAP, corr.clone(), "chain_step", step_id.to_string()))?;

        let is_approver = step.approver == actor;
        let is_delegate = self
            .store
            .active_delegations_for(step.approver, self.clock.today())
            .iter()
            .any(|d| d.delegate == actor);
        if !is_approver && !is_delegate {
            return Err(CoreError::permission_denied(
                OP_DECIDE_SWAP,
                corr,
                Permission::ApproveSwap.key(),
            ));
        }

        if step.status != ChainStepStatus::Pending {
            return Err(CoreError::blocking(
                OP_DECIDE_SWAP,
                corr,
                "chain step is not pending",
                Vec::new(),
            ));
        }

        let chain = self.store.chain_steps_for_request(step.swap_request);
        let lower_levels_approved = chain
            .iter()
            .filter(|s| s.level < step.level)
            .all(|s| s.status == ChainStepStatus::Approved || s.status == ChainStepStatus::AutoApproved);
        if !lower_levels_approved {
            return Err(CoreError::blocking(
                OP_DECIDE_SWAP,
                corr,
                "a lower chain level has not yet been approved",
                Vec::new(),
            ));
        }

        let swap = self
            .store
            .get_swap_request(step.swap_request)
            .ok_or_else(|| CoreError::not_found(OP_DECIDE_SWAP, corr.clone(), "swap_request", step.swap_request.to_string()))?;

        match decision {
            StepDecision::Approve => {
                step.status = ChainStepStatus::Approved;
                step.decided_at = Some(self.clock.now());
                step.notes = notes.clone();
                self.store.update_chain_step(step.clone())?;

                self.append_audit(
                    swap.id,
                    AuditAction::Approved,
                    Some(actor),
                    Some(step.id),
                    Some(step.originating_rule),
                    notes,
                    json!({"level": step.level}),
                )?;

                let next_level = chain.iter().find(|s| s.level == step.level + 1);
                if let Some(next) = next_level {
                    self.event_sink.emit(
                        DomainEvent::SwapChainStepPending {
                            swap_request: swap.id,
                            approver: next.approver,
                        },
                        next.approver,
                        self.clock.now(),
                    );
                    Ok(Outcome::clean(()))
                } else {
                    let audit = SwapApprovalAudit {
                        id: self.store.next_audit_id(),
                        swap_request: swap.id,
                        action: AuditAction::Approved,
                        actor: Some(actor),
                        chain_step: Some(step.id),
                        rule: Some(step.originating_rule),
                        notes: None,
                        metadata: json!({"final_level": step.level}),
                        created_at: self.clock.now(),
                    };
                    self.store.execute_swap(swap.id, audit)?;

                    self.event_sink.emit(
                        DomainEvent::SwapDecided {
                            swap_request: swap.id,
                            approved: true,
                        },
                        swap.requesting_employee,
                        self.clock.now(),
                    );
                    if let Some(target_employee) = swap.target_employee {
                        self.event_sink.emit(
                            DomainEvent::SwapDecided {
                                swap_request: swap.id,
                                approved: true,
                            },
                            target_employee,
                            self.clock.now(),
                        );
                    }
                    Ok(Outcome::clean(()))
                }
            }
            StepDecision::Reject => {
                step.status = ChainStepStatus::Rejected;
                step.decided_at = Some(self.clock.now());
                step.notes = notes.clone();
                self.store.update_chain_step(step.clone())?;

                let mut rejected_swap = swap.clone();
                rejected_swap.status = SwapStatus::Rejected;
                rejected_swap.version += 1;
                self.store.update_swap_request(rejected_swap, swap.version)?;

                self.append_audit(
                    swap.id,
                    AuditAction::Rejected,
                    Some(actor),
                    Some(step.id),
                    Some(step.originating_rule),
                    notes,
                    json!({"level": step.level}),
                )?;
                self.event_sink.emit(
                    DomainEvent::SwapDecided {
                        swap_request: swap.id,
                        approved: false,
                    },
                    swap.requesting_employee,
                    self.clock.now(),
                );
                Ok(Outcome::clean(()))
            }
            StepDecision::Delegate => {
                let rule = self.store.get_rule(step.originating_rule).unwrap_or_else(SwapApprovalRule::system_default);
                if !rule.manual_approval.delegation_allowed {
                    return Err(CoreError::blocking(
                        OP_DECIDE_SWAP,
                        corr,
                        "the originating rule does not allow delegation",
                        Vec::new(),
                    ));
                }
                let delegate = delegate_to.ok_or_else(|| {
                    CoreError::validation(OP_DECIDE_SWAP, corr.clone(), "delegate_to", "required for a delegate decision")
                })?;

                step.status = ChainStepStatus::Delegated;
                step.decided_at = Some(self.clock.now());
                step.delegated_to = Some(delegate);
                step.notes = notes.clone();
                self.store.update_chain_step(step.clone())?;

                let new_step_id = self.store.next_chain_step_id();
                self.store.add_chain_step(SwapApprovalChainStep {
                    id: new_step_id,
                    swap_request: step.swap_request,
                    level: step.level,
                    approver: delegate,
                    status: ChainStepStatus::Pending,
                    decided_at: None,
                    notes: None,
                    delegated_to: None,
                    originating_rule: step.originating_rule,
                })?;

                self.append_audit(
                    swap.id,
                    AuditAction::Delegated,
                    Some(actor),
                    Some(step.id),
                    Some(step.originating_rule),
                    notes,
                    json!({"level": step.level, "delegate": delegate.to_string()}),
                )?;
                self.event_sink.emit(
                    DomainEvent::SwapChainStepPending {
                        swap_request: swap.id,
                        approver: delegate,
                    },
                    delegate,
                    self.clock.now(),
                );
                Ok(Outcome::clean(()))
            }
        }
    }

    /// Leave submission through the same engine, one manager level, no
    /// auto-approval; blocked outright if the conflict report is blocking.
    pub fn submit_leave(
        &self,
        actor: EmployeeId,
        mut request: LeaveRequest,
        team: Option<TeamId>,
    ) -> CoreResult<(LeaveRequestId, Outcome<()>)> {
        self.require(actor, Permission::RequestLeave, OP_SUBMIT_LEAVE)?;
        let corr = Self::correlation(OP_SUBMIT_LEAVE, actor);

        let conflicts = ConflictService::new(self.store, self.config).check_leave_conflicts(
            request.employee_id,
            request.start_date,
            request.end_date,
            team,
        );
        if conflicts.is_blocking() {
            let blocking: Vec<Conflict> = conflicts
                .shift_conflicts
                .iter()
                .map(|s| Conflict {
                    shift_id: s.id,
                    severity: crate::domain::value_objects::Severity::High,
                    kind: crate::domain::value_objects::ConflictKind::DoubleBooking {
                        conflicting_shift: s.id,
                        overlap_hours: s.duration_hours(),
                    },
                })
                .collect();
            return Err(CoreError::blocking(
                OP_SUBMIT_LEAVE,
                corr,
                "requested leave overlaps existing leave or scheduled shifts",
                blocking,
            ));
        }

        request.id = self.store.next_leave_request_id();
        request.status = LeaveStatus::Pending;
        request.requested_days = LeaveRequest::day_count(request.start_date, request.end_date);
        request.created_at = self.clock.now();
        request.decider = None;
        request.decided_at = None;
        request.resolution_note = None;
        request.version = 0;
        let id = request.id;
        self.store.add_leave_request(request.clone())?;

        self.event_sink.emit(
            DomainEvent::LeaveSubmitted {
                leave_request: id,
                employee: request.employee_id,
            },
            request.employee_id,
            self.clock.now(),
        );

        let has_warnings = !conflicts.staffing_analysis.values().all(|d| !d.understaffed);
        if has_warnings {
            let warnings: Vec<Conflict> = Vec::new();
            Ok((id, Outcome::with_warnings((), warnings)))
        } else {
            Ok((id, Outcome::clean(())))
        }
    }

    /// Single-level leave decision.
    pub fn decide_leave(
        &self,
        actor: EmployeeId,
        request_id: LeaveRequestId,
        approve: bool,
        expected_version: u64,
        note: Option<String>,
    ) -> CoreResult<()> {
        self.require(actor, Permission::ApproveLeave, OP_DECIDE_LEAVE)?;
        let corr = Self::correlation(OP_DECIDE_LEAVE, actor);

        let mut request = self.store.get_leave_request(request_id).ok_or_else(|| {
            CoreError::not_found(OP_DECIDE_LEAVE, corr.clone(), "leave_request", request_id.to_string())
        })?;
        if request.status != LeaveStatus::Pending {
            return Err(CoreError::blocking(
                OP_DECIDE_LEAVE,
                corr,
                "leave request is not pending",
                Vec::new(),
            ));
        }

        request.status = if approve { LeaveStatus::Approved } else { LeaveStatus::Rejected };
        request.decider = Some(actor);
        request.decided_at = Some(self.clock.now());
        request.resolution_note = note;
        request.version += 1;
        self.store.update_leave_request(request.clone(), expected_version)?;

        self.event_sink.emit(
            DomainEvent::LeaveDecided {
                leave_request: request_id,
                approved: approve,
            },
            request.employee_id,
            self.clock.now(),
        );
        Ok(())
    }

    /// Approves one of a set of mutually-conflicting leave requests,
    /// atomically rejecting the rest with a shared resolution note.
    pub fn resolve_leave_conflict(
        &self,
        actor: EmployeeId,
        approve: LeaveRequestId,
        reject: Vec<LeaveRequestId>,
        resolution_note: String,
    ) -> CoreResult<()> {
        self.require(actor, Permission::ApproveLeave, OP_RESOLVE_CONFLICT)?;
        self.store
            .resolve_leave_conflict_set(approve, reject.clone(), actor, self.clock.now(), resolution_note.clone())?;

        if let Some(winner) = self.store.get_leave_request(approve) {
            self.event_sink.emit(
                DomainEvent::LeaveDecided {
                    leave_request: approve,
                    approved: true,
                },
                winner.employee_id,
                self.clock.now(),
            );
        }
        for rejected_id in reject {
            if let Some(loser) = self.store.get_leave_request(rejected_id) {
                self.event_sink.emit(
                    DomainEvent::LeaveDecided {
                        leave_request: rejected_id,
                        approved: false,
                    },
                    loser.employee_id,
                    self.clock.now(),
                );
            }
        }
        Ok(())
    }

    /// Advisory recommendation across three voting rules: seniority
    /// (earliest hire), first-submitted, least-leave-used-this-year.
    /// Ties broken by seniority.
    pub fn recommend_leave_conflict_resolution(
        &self,
        candidates: &[LeaveRequestId],
    ) -> Option<ConflictRecommendation> {
        let requests: Vec<LeaveRequest> = candidates
            .iter()
            .filter_map(|id| self.store.get_leave_request(*id))
            .collect();
        if requests.is_empty() {
            return None;
        }
        let today = self.clock.today();
        let year = today.year();

        let seniority_pick = requests
            .iter()
            .filter_map(|r| self.store.get_employee(r.employee_id).map(|e| (r.id, e.hire_date)))
            .min_by_key(|(_, hire_date)| *hire_date)
            .map(|(id, _)| id)
            .unwrap_or(requests[0].id);

        let first_submitted_pick = requests
            .iter()
            .min_by_key(|r| r.created_at)
            .map(|r| r.id)
            .unwrap_or(requests[0].id);

        let least_used_pick = requests
            .iter()
            .min_by_key(|r| self.leave_used_in_year(r.employee_id, year))
            .map(|r| r.id)
            .unwrap_or(requests[0].id);

        let mut tally: std::collections::HashMap<LeaveRequestId, u32> = std::collections::HashMap::new();
        for pick in [seniority_pick, first_submitted_pick, least_used_pick] {
            *tally.entry(pick).or_insert(0) += 1;
        }

        let max_votes = tally.values().copied().max().unwrap_or(0);
        let mut tied: Vec<LeaveRequestId> = tally
            .iter()
            .filter(|(_, v)| **v == max_votes)
            .map(|(k, _)| *k)
            .collect();
        tied.sort_by_key(|id| *id);

        let recommended = if tied.len() == 1 {
            tied[0]
        } else {
            seniority_pick
        };

        Some(ConflictRecommendation {
            recommended,
            votes: max_votes,
            seniority_pick,
            first_submitted_pick,
            least_used_pick,
        })
    }

    fn leave_used_in_year(&self, employee: EmployeeId, year: i32) -> u32 {
        self.store
            .leave_requests_for_employee(employee)
            .into_iter()
            .filter(|r| r.status == LeaveStatus::Approved && r.start_date.year() == year)
            .map(|r| r.requested_days)
            .sum()
    }

    pub fn create_delegation(
        &self,
        actor: EmployeeId,
        delegator: EmployeeId,
        delegate: EmployeeId,
        start_date: chrono::NaiveDate,
        end_date: Option<chrono::NaiveDate>,
        reason: Option<String>,
    ) -> CoreResult<DelegationId> {
        self.require(actor, Permission::CreateDelegation, OP_CREATE_DELEGATION)?;
        let id = self.store.next_delegation_id();
        self.store.add_delegation(ApprovalDelegation {
            id,
            delegator,
            delegate,
            start_date,
            end_date,
            active: true,
            reason,
        })?;
        Ok(id)
    }

    /// Every chain step currently awaiting `user`'s decision, whether
    /// assigned to them directly or inherited through an active
    /// delegation from another approver.
    pub fn list_pending_for(&self, user: EmployeeId) -> Vec<SwapApprovalChainStep> {
        let mut direct = self.store.pending_chain_steps_for(user);
        let today = self.clock.today();

        let inherited = self
            .store
            .all_pending_chain_steps()
            .into_iter()
            .filter(|step| step.approver != user)
            .filter(|step| {
                self.store
                    .active_delegations_for(step.approver, today)
                    .iter()
                    .any(|d| d.delegate == user)
            });

        direct.extend(inherited);
        direct.sort_by(|a, b| a.level.cmp(&b.level).then(a.id.cmp(&b.id)));
        direct.dedup_by_key(|s| s.id);
        direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capabilities::clock::FrozenClock;
    use crate::domain::capabilities::escalation::NullEscalationResolver;
    use crate::domain::entities::{Employee, Shift, ShiftTemplate, Team};
    use crate::domain::value_objects::{EmployeeId, ShiftId, ShiftTemplateId, SwapRuleId, TeamId};
    use crate::infrastructure::memory_store::InMemoryDomainStore;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use std::collections::HashSet;

    struct AllowAll;
    impl PermissionChecker for AllowAll {
        fn has(&self, _actor: EmployeeId, _permission: Permission) -> bool {
            true
        }
    }

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&self, _event: DomainEvent, _recipient: EmployeeId, _occurred_at: chrono::DateTime<Utc>) {}
    }

    fn seed_employees(store: &InMemoryDomainStore, hire_date: NaiveDate) {
        for (id, name) in [(1u64, "Requester"), (2, "Target")] {
            let mut e = Employee::new(EmployeeId(id), name, hire_date);
            e.team = Some(TeamId(1));
            store.add_employee(e).unwrap();
        }
        let team = Team::new(TeamId(1), "T1");
        store.add_team(team).unwrap();
    }

    fn seed_shift(store: &InMemoryDomainStore, id: u64, employee: u64, start: chrono::DateTime<Utc>) -> ShiftId {
        let template = ShiftTemplateId(1);
        if store.get_template(template).is_none() {
            store
                .add_template(ShiftTemplate::new(
                    template,
                    "Incidents",
                    ShiftClass::Incidents,
                    NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                ))
                .unwrap();
        }
        let shift = Shift {
            id: ShiftId(id),
            template_id: template,
            employee_id: EmployeeId(employee),
            class: ShiftClass::Incidents,
            start,
            end: start + chrono::Duration::hours(9),
            status: ShiftStatus::Scheduled,
            notes: None,
            auto_assigned: false,
            reason: None,
        };
        store.apply_generated_shifts(vec![shift]).unwrap();
        ShiftId(id)
    }

    #[test]
    fn auto_approval_swaps_assigned_employees() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let frozen_now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let clock = FrozenClock::new(frozen_now);
        let permissions = AllowAll;
        let escalation = NullEscalationResolver;
        let sink = NullSink;

        seed_employees(&store, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let requesting_shift = seed_shift(&store, 1, 1, frozen_now + chrono::Duration::hours(48));
        let target_shift = seed_shift(&store, 2, 2, frozen_now + chrono::Duration::hours(72));

        store
            .add_rule(SwapApprovalRule {
                id: SwapRuleId(1),
                priority: 5,
                active: true,
                applies_to: [ShiftClass::Incidents].into_iter().collect(),
                auto_approval_enabled: true,
                auto_approval: crate::domain::entities::approval::AutoApprovalPredicates {
                    same_class_required: true,
                    min_advance_hours: 24,
                    min_seniority_months: 3,
                    skills_match_required: false,
                },
                manual_approval: crate::domain::entities::approval::ManualApprovalSpec {
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

        let s1 = store.get_shift(requesting_shift).unwrap();
        let s2 = store.get_shift(target_shift).unwrap();
        assert_eq!(s1.employee_id, EmployeeId(2));
        assert_eq!(s2.employee_id, EmployeeId(1));

        let audits = store.audits_for_request(swap_id);
        assert!(audits.iter().any(|a| a.action == AuditAction::AutoApproved));
    }

    #[test]
    fn manual_chain_requires_lower_level_before_higher() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let frozen_now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let clock = FrozenClock::new(frozen_now);
        let permissions = AllowAll;
        let escalation = NullEscalationResolver;
        let sink = NullSink;

        seed_employees(&store, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let mut manager = Employee::new(EmployeeId(3), "Manager", NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        manager.team = Some(TeamId(1));
        store.add_employee(manager).unwrap();
        let mut team = store.get_team(TeamId(1)).unwrap();
        team.manager = Some(EmployeeId(3));
        // Teams have no update_team in the store contract; re-add via add_team's
        // overwrite semantics instead.
        store.add_team(team).unwrap();

        let requesting_shift = seed_shift(&store, 1, 1, frozen_now + chrono::Duration::hours(1));
        let target_shift = seed_shift(&store, 2, 2, frozen_now + chrono::Duration::hours(2));

        store
            .add_rule(SwapApprovalRule {
                id: SwapRuleId(1),
                priority: 5,
                active: true,
                applies_to: [ShiftClass::Incidents].into_iter().collect(),
                auto_approval_enabled: false,
                auto_approval: crate::domain::entities::approval::AutoApprovalPredicates {
                    same_class_required: true,
                    min_advance_hours: 0,
                    min_seniority_months: 0,
                    skills_match_required: false,
                },
                manual_approval: crate::domain::entities::approval::ManualApprovalSpec {
                    manager_required: true,
                    admin_required: false,
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
        let level2 = chain.iter().find(|s| s.level == 2).unwrap();

        let err = engine
            .decide_swap_step(level2.approver, level2.id, StepDecision::Approve, None, None)
            .unwrap_err();
        assert!(matches!(err.kind, CoreErrorKind::ConflictBlocking { .. }));
    }

    #[test]
    fn recommendation_picks_majority_winner() {
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
        let submitted = [(1u64, 10u64, 10), (2, 11, 30), (3, 12, 5)];
        for (req_id, emp_id, minutes_after) in submitted {
            store
                .add_leave_request(LeaveRequest {
                    id: LeaveRequestId(req_id),
                    employee_id: EmployeeId(emp_id),
                    leave_type: crate::domain::value_objects::LeaveType::Vacation,
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
        }

        let engine = ApprovalWorkflowEngine::new(&store, &config, &clock, &permissions, &escalation, &sink);
        let recommendation = engine
            .recommend_leave_conflict_resolution(&[LeaveRequestId(1), LeaveRequestId(2), LeaveRequestId(3)])
            .unwrap();
        assert_eq!(recommendation.recommended, LeaveRequestId(1));
        assert_eq!(recommendation.votes, 2);
    }
}
