//! LeaveRequest entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EmployeeId, LeaveRequestId, LeaveStatus, LeaveType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub leave_type: LeaveType,
    /// Inclusive on both ends.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requested_days: u32,
    pub status: LeaveStatus,
    pub decider: Option<EmployeeId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub resolution_note: Option<String>,
    /// Submission instant; breaks first-submitted ties in conflict
    /// recommendation voting.
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency version; bumped on every decision.
    pub version: u64,
}

impl LeaveRequest {
    /// `end_date == start_date` requests one day of leave (both ends
    /// inclusive of a single calendar day).
    pub fn day_count(start_date: NaiveDate, end_date: NaiveDate) -> u32 {
        (end_date - start_date).num_days().max(0) as u32 + 1
    }

    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn is_non_rejected(&self) -> bool {
        !matches!(self.status, LeaveStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_count_same_day_is_one() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(LeaveRequest::day_count(d, d), 1);
    }

    #[test]
    fn day_count_range() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
        assert_eq!(LeaveRequest::day_count(start, end), 8);
    }
}
