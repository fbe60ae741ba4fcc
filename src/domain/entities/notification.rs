//! NotificationEvent and per-employee NotificationPreference.

use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    EmployeeId, LeaveRequestId, NotificationClass, NotificationId, ShiftId, SwapRequestId,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub id: NotificationId,
    pub recipient: EmployeeId,
    pub class: NotificationClass,
    pub title: String,
    pub body: String,
    pub action_link: Option<String>,
    pub shift: Option<ShiftId>,
    pub leave_request: Option<LeaveRequestId>,
    pub swap_request: Option<SwapRequestId>,
    pub channel_email: bool,
    pub channel_in_app: bool,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-class opt-ins plus a quiet-hours window. Quiet hours may wrap
/// midnight (`start > end`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreference {
    pub employee_id: EmployeeId,
    pub email_enabled: HashMap<NotificationClass, bool>,
    pub in_app_enabled: HashMap<NotificationClass, bool>,
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
}

impl NotificationPreference {
    pub fn default_for(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            email_enabled: HashMap::new(),
            in_app_enabled: HashMap::new(),
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }

    pub fn email_enabled_for(&self, class: NotificationClass) -> bool {
        *self.email_enabled.get(&class).unwrap_or(&true)
    }

    pub fn in_app_enabled_for(&self, class: NotificationClass) -> bool {
        *self.in_app_enabled.get(&class).unwrap_or(&true)
    }

    pub fn in_quiet_hours(&self, at: NaiveTime) -> bool {
        match (self.quiet_hours_start, self.quiet_hours_end) {
            (Some(start), Some(end)) if start <= end => at >= start && at < end,
            (Some(start), Some(end)) => at >= start || at < end,
            _ => false,
        }
    }
}
