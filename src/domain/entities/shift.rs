//! Shift entity.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EmployeeId, ShiftClass, ShiftId, ShiftStatus, ShiftTemplateId};

/// A single assignment of one Employee to a half-open time interval
/// `[start, end)`. Overnight shifts are permitted (`end` may fall on the
/// next civil date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shift {
    pub id: ShiftId,
    pub template_id: ShiftTemplateId,
    pub employee_id: EmployeeId,
    pub class: ShiftClass,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: ShiftStatus,
    pub notes: Option<String>,
    pub auto_assigned: bool,
    pub reason: Option<String>,
}

impl Shift {
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.start < other_end && other_start < self.end
    }

    /// Every civil date `[start, end)` touches, in the shift's own instant
    /// representation (callers needing organization-timezone dates convert
    /// through the Clock & Calendar capability).
    pub fn civil_dates(&self) -> Vec<chrono::NaiveDate> {
        let mut dates = Vec::new();
        let mut cursor = self.start.date_naive();
        let last = if self.end.time() == chrono::NaiveTime::MIN {
            self.end.date_naive() - chrono::Duration::days(1)
        } else {
            self.end.date_naive()
        };
        while cursor <= last {
            dates.push(cursor);
            cursor += chrono::Duration::days(1);
            if dates.len() > 400 {
                break;
            }
        }
        dates
    }

    pub fn iso_week(&self) -> (i32, u32) {
        let iso = self.start.date_naive().iso_week();
        (iso.year(), iso.week())
    }
}
