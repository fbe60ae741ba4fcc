//! Approval-chain entities: rules, chain steps, delegations, audit.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    AuditId, AuditAction, ChainStepId, ChainStepStatus, EmployeeId, ShiftClass, SwapRequestId,
    SwapRuleId,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoApprovalPredicates {
    pub same_class_required: bool,
    pub min_advance_hours: i64,
    pub min_seniority_months: i64,
    pub skills_match_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualApprovalSpec {
    pub manager_required: bool,
    pub admin_required: bool,
    /// `1..=5`.
    pub levels_required: u8,
    pub delegation_allowed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapApprovalRule {
    pub id: SwapRuleId,
    /// Higher wins.
    pub priority: i32,
    pub active: bool,
    pub applies_to: HashSet<ShiftClass>,
    pub auto_approval_enabled: bool,
    pub auto_approval: AutoApprovalPredicates,
    pub manual_approval: ManualApprovalSpec,
    pub monthly_swap_cap: u32,
    pub notify: bool,
}

impl SwapApprovalRule {
    /// The rule applied when no active rule matches a request's class.
    pub fn system_default() -> Self {
        Self {
            id: SwapRuleId(0),
            priority: i32::MIN,
            active: true,
            applies_to: ShiftClass::ALL.into_iter().collect(),
            auto_approval_enabled: false,
            auto_approval: AutoApprovalPredicates {
                same_class_required: true,
                min_advance_hours: 0,
                min_seniority_months: 0,
                skills_match_required: false,
            },
            manual_approval: ManualApprovalSpec {
                manager_required: true,
                admin_required: false,
                levels_required: 1,
                delegation_allowed: false,
            },
            monthly_swap_cap: u32::MAX,
            notify: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapApprovalChainStep {
    pub id: ChainStepId,
    pub swap_request: SwapRequestId,
    /// 1-based.
    pub level: u8,
    pub approver: EmployeeId,
    pub status: ChainStepStatus,
    pub decided_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub delegated_to: Option<EmployeeId>,
    pub originating_rule: SwapRuleId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalDelegation {
    pub id: crate::domain::value_objects::DelegationId,
    pub delegator: EmployeeId,
    pub delegate: EmployeeId,
    pub start_date: NaiveDate,
    /// Open-ended when `None`.
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub reason: Option<String>,
}

impl ApprovalDelegation {
    pub fn is_currently_active(&self, today: NaiveDate) -> bool {
        self.active
            && self.start_date <= today
            && self.end_date.map(|end| today <= end).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapApprovalAudit {
    pub id: AuditId,
    pub swap_request: SwapRequestId,
    pub action: AuditAction,
    /// `None` means the system acted (auto-approval, rule application).
    pub actor: Option<EmployeeId>,
    pub chain_step: Option<ChainStepId>,
    pub rule: Option<SwapRuleId>,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
