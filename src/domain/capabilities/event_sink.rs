//! Event Sink capability.
//!
//! Explicit `EventSink.emit` calls from the orchestrator and approval
//! engine replace framework signals/receivers — the store itself has no
//! side effects beyond persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    EmployeeId, LeaveRequestId, NotificationClass, ShiftId, SwapRequestId,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DomainEvent {
    ShiftAssigned {
        shift: ShiftId,
        employee: EmployeeId,
    },
    ShiftCancelled {
        shift: ShiftId,
        employee: EmployeeId,
    },
    SwapSubmitted {
        swap_request: SwapRequestId,
        requesting_employee: EmployeeId,
    },
    SwapChainStepPending {
        swap_request: SwapRequestId,
        approver: EmployeeId,
    },
    SwapDecided {
        swap_request: SwapRequestId,
        approved: bool,
    },
    LeaveSubmitted {
        leave_request: LeaveRequestId,
        employee: EmployeeId,
    },
    LeaveDecided {
        leave_request: LeaveRequestId,
        approved: bool,
    },
}

impl DomainEvent {
    pub fn notification_class(&self) -> NotificationClass {
        match self {
            DomainEvent::ShiftAssigned { .. } => NotificationClass::ShiftAssigned,
            DomainEvent::ShiftCancelled { .. } => NotificationClass::ShiftCancelled,
            DomainEvent::SwapSubmitted { .. } => NotificationClass::SwapRequested,
            DomainEvent::SwapChainStepPending { .. } => NotificationClass::SwapApprovalPending,
            DomainEvent::SwapDecided { approved, .. } => {
                if *approved {
                    NotificationClass::SwapApproved
                } else {
                    NotificationClass::SwapRejected
                }
            }
            DomainEvent::LeaveSubmitted { .. } => NotificationClass::LeaveRequested,
            DomainEvent::LeaveDecided { approved, .. } => {
                if *approved {
                    NotificationClass::LeaveApproved
                } else {
                    NotificationClass::LeaveRejected
                }
            }
        }
    }

}

/// Accepts domain events and, per recipient preferences, creates
/// in-app `NotificationEvent`s and enqueues email payloads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent, recipient: EmployeeId, occurred_at: DateTime<Utc>);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailPayload {
    pub recipient: EmployeeId,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

/// Best-effort delivery. Failures are logged but never escalate to the
/// originating caller (`NotificationDeliveryFailure` is non-fatal).
pub trait EmailQueue: Send + Sync {
    fn enqueue(&self, payload: EmailPayload);
}
