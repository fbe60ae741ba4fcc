//! Domain Store contract.
//!
//! Transactional reads and writes of every entity in the data model, plus
//! a handful of explicitly atomic composite operations (apply a generated
//! schedule, execute an approved swap, resolve a set of
//! mutually-conflicting leave requests) that must never leave the store
//! half-updated. Replaces dynamic-ORM querysets with named, index-backed
//! queries; N+1 avoidance is the store's responsibility, not its
//! callers'.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    ApprovalDelegation, Department, Employee, LeaveRequest, NotificationEvent,
    NotificationPreference, RecurringShiftPattern, Shift, ShiftTemplate, SwapApprovalAudit,
    SwapApprovalChainStep, SwapApprovalRule, SwapRequest, Team,
};
use crate::domain::errors::CoreResult;
use crate::domain::value_objects::{
    ChainStepId, DelegationId, DepartmentId, EmployeeId, LeaveRequestId, PatternId, ShiftClass,
    ShiftId, ShiftStatus, ShiftTemplateId, SwapRequestId, SwapRuleId, TeamId,
};

/// Range query parameters for `DomainStore::shifts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftQuery {
    pub employee: Option<EmployeeId>,
    pub team: Option<TeamId>,
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub statuses: Option<Vec<ShiftStatus>>,
}

/// Result of an orchestrator `apply` (or a successful `bulk_*` write).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyReport {
    pub created: Vec<ShiftId>,
    pub unassigned: Vec<(NaiveDate, ShiftClass, String)>,
}

pub trait DomainStore: Send + Sync {
    // -- Employees --------------------------------------------------
    fn add_employee(&self, employee: Employee) -> CoreResult<()>;
    fn update_employee(&self, employee: Employee) -> CoreResult<()>;
    fn get_employee(&self, id: EmployeeId) -> Option<Employee>;
    fn list_employees(&self) -> Vec<Employee>;
    fn employees_in_team(&self, team: TeamId) -> Vec<Employee>;

    // -- Teams / Departments -----------------------------------------
    fn add_team(&self, team: Team) -> CoreResult<()>;
    fn get_team(&self, id: TeamId) -> Option<Team>;
    fn list_teams(&self) -> Vec<Team>;
    fn add_department(&self, department: Department) -> CoreResult<()>;
    fn get_department(&self, id: DepartmentId) -> Option<Department>;

    // -- Shift templates -----------------------------------------------
    fn add_template(&self, template: ShiftTemplate) -> CoreResult<()>;
    fn update_template(&self, template: ShiftTemplate) -> CoreResult<()>;
    fn get_template(&self, id: ShiftTemplateId) -> Option<ShiftTemplate>;
    fn list_templates(&self) -> Vec<ShiftTemplate>;

    // -- Shifts -----------------------------------------------------
    fn add_shift(&self, shift: Shift) -> CoreResult<ShiftId>;
    fn update_shift(&self, shift: Shift) -> CoreResult<()>;
    fn delete_shift(&self, id: ShiftId) -> CoreResult<()>;
    fn get_shift(&self, id: ShiftId) -> Option<Shift>;
    fn shifts(&self, query: &ShiftQuery) -> Vec<Shift>;
    /// Non-cancelled shifts for `employee` intersecting `[start, end)`,
    /// optionally excluding one shift id (used when re-checking an
    /// edited shift against itself).
    fn overlapping_shifts(
        &self,
        employee: EmployeeId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ShiftId>,
    ) -> Vec<Shift>;
    fn hours_for_day(&self, employee: EmployeeId, date: NaiveDate) -> f64;
    fn hours_for_iso_week(&self, employee: EmployeeId, iso_year: i32, iso_week: u32) -> f64;
    fn hours_for_month(&self, employee: EmployeeId, year: i32, month: u32) -> f64;
    /// Count of assigned class-days in `[start, end]`, per the fairness
    /// engine's counting rule (weekday count for incidents/changes,
    /// calendar-day count for waakdienst).
    fn assigned_class_days(
        &self,
        employee: EmployeeId,
        class: ShiftClass,
        start: NaiveDate,
        end: NaiveDate,
    ) -> u32;

    /// Atomically persists every shift in `shifts` or none of them.
    /// Used by orchestrator `apply` and `bulk_create_from_template`.
    fn apply_generated_shifts(&self, shifts: Vec<Shift>) -> CoreResult<Vec<ShiftId>>;

    // -- Recurring patterns -------------------------------------------
    fn add_pattern(&self, pattern: RecurringShiftPattern) -> CoreResult<()>;
    fn update_pattern(&self, pattern: RecurringShiftPattern) -> CoreResult<()>;
    fn get_pattern(&self, id: PatternId) -> Option<RecurringShiftPattern>;
    fn list_patterns(&self) -> Vec<RecurringShiftPattern>;

    // -- Leave requests -----------------------------------------------
    fn add_leave_request(&self, request: LeaveRequest) -> CoreResult<()>;
    /// Compare-and-swap on `version`; returns `StaleState` on mismatch.
    fn update_leave_request(
        &self,
        request: LeaveRequest,
        expected_version: u64,
    ) -> CoreResult<()>;
    fn get_leave_request(&self, id: LeaveRequestId) -> Option<LeaveRequest>;
    fn leave_requests_for_employee(&self, employee: EmployeeId) -> Vec<LeaveRequest>;
    fn leave_requests_overlapping(
        &self,
        employee: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<LeaveRequest>;
    fn approved_leave_on_date(&self, team: TeamId, date: NaiveDate) -> Vec<EmployeeId>;
    fn pending_leave_requests(&self, team: Option<TeamId>) -> Vec<LeaveRequest>;

    /// Atomically approves `approve` and rejects every id in `reject`,
    /// recording `resolution_note` on each.
    fn resolve_leave_conflict_set(
        &self,
        approve: LeaveRequestId,
        reject: Vec<LeaveRequestId>,
        decider: EmployeeId,
        decided_at: DateTime<Utc>,
        resolution_note: String,
    ) -> CoreResult<()>;

    // -- Swap requests -----------------------------------------------
    fn add_swap_request(&self, request: SwapRequest) -> CoreResult<()>;
    fn update_swap_request(
        &self,
        request: SwapRequest,
        expected_version: u64,
    ) -> CoreResult<()>;
    fn get_swap_request(&self, id: SwapRequestId) -> Option<SwapRequest>;
    fn approved_swaps_this_month(
        &self,
        employee: EmployeeId,
        year: i32,
        month: u32,
    ) -> u32;

    /// Atomically marks `swap` approved, exchanges `assigned_employee` on
    /// both referenced shifts (or just reassigns the requesting shift for
    /// a one-way swap), and appends `audit` — all effects persist or none
    /// do.
    fn execute_swap(&self, swap: SwapRequestId, audit: SwapApprovalAudit) -> CoreResult<()>;

    // -- Approval rules / chain / delegation / audit -------------------
    fn add_rule(&self, rule: SwapApprovalRule) -> CoreResult<()>;
    fn get_rule(&self, id: SwapRuleId) -> Option<SwapApprovalRule>;
    fn active_rules_for_class(&self, class: ShiftClass) -> Vec<SwapApprovalRule>;

    fn add_chain_step(&self, step: SwapApprovalChainStep) -> CoreResult<()>;
    fn update_chain_step(&self, step: SwapApprovalChainStep) -> CoreResult<()>;
    fn get_chain_step(&self, id: ChainStepId) -> Option<SwapApprovalChainStep>;
    /// Ordered by `level` ascending.
    fn chain_steps_for_request(&self, swap: SwapRequestId) -> Vec<SwapApprovalChainStep>;
    /// Raw chain steps currently pending for `approver`, with no
    /// delegation resolution applied — the approval engine expands these
    /// through `active_delegations_for` in a separate pass.
    fn pending_chain_steps_for(&self, approver: EmployeeId) -> Vec<SwapApprovalChainStep>;
    /// Every pending chain step store-wide, regardless of approver —
    /// the approval engine's delegation resolver scans this to find
    /// steps a delegate has inherited.
    fn all_pending_chain_steps(&self) -> Vec<SwapApprovalChainStep>;

    fn add_delegation(&self, delegation: ApprovalDelegation) -> CoreResult<()>;
    fn get_delegation(&self, id: DelegationId) -> Option<ApprovalDelegation>;
    fn active_delegations_for(
        &self,
        delegator: EmployeeId,
        today: NaiveDate,
    ) -> Vec<ApprovalDelegation>;

    /// Append-only; the store rejects attempts to mutate existing rows.
    fn append_audit(&self, audit: SwapApprovalAudit) -> CoreResult<()>;
    fn audits_for_request(&self, swap: SwapRequestId) -> Vec<SwapApprovalAudit>;

    // -- Notifications --------------------------------------------------
    fn add_notification(&self, notification: NotificationEvent) -> CoreResult<()>;
    fn notifications_for(&self, recipient: EmployeeId) -> Vec<NotificationEvent>;
    fn get_preference(&self, employee: EmployeeId) -> NotificationPreference;
    fn set_preference(&self, preference: NotificationPreference) -> CoreResult<()>;

    // -- Id allocation --------------------------------------------------
    fn next_shift_id(&self) -> ShiftId;
    fn next_leave_request_id(&self) -> LeaveRequestId;
    fn next_swap_request_id(&self) -> SwapRequestId;
    fn next_chain_step_id(&self) -> ChainStepId;
    fn next_audit_id(&self) -> crate::domain::value_objects::AuditId;
    fn next_notification_id(&self) -> crate::domain::value_objects::NotificationId;
    fn next_pattern_id(&self) -> PatternId;
    fn next_delegation_id(&self) -> DelegationId;
}
