use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    /// Shifts in these statuses are excluded from overlap/double-booking
    /// checks and from swap eligibility.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShiftStatus::Cancelled)
    }

    pub fn blocks_swap(&self) -> bool {
        matches!(
            self,
            ShiftStatus::Completed | ShiftStatus::Cancelled | ShiftStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    Sick,
    Emergency,
    Personal,
    Other,
}

impl LeaveType {
    /// `leave_conflict` is HIGH severity for these types, MEDIUM otherwise.
    pub fn is_high_severity(&self) -> bool {
        matches!(self, LeaveType::Sick | LeaveType::Emergency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStepStatus {
    Pending,
    Approved,
    Rejected,
    Skipped,
    Delegated,
    AutoApproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    RuleApplied,
    AutoApproved,
    Approved,
    Rejected,
    Delegated,
    Escalated,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationClass {
    ShiftAssigned,
    ShiftCancelled,
    SwapRequested,
    SwapApprovalPending,
    SwapApproved,
    SwapRejected,
    LeaveRequested,
    LeaveApproved,
    LeaveRejected,
    ApprovalEscalated,
}
