//! RecurringShiftPattern entity.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EmployeeId, PatternId, ShiftTemplateId, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringShiftPattern {
    pub id: PatternId,
    pub template_id: ShiftTemplateId,
    pub recurrence: RecurrenceKind,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Populated for `Weekly`/`Biweekly`.
    pub weekdays: HashSet<Weekday>,
    /// Populated for `Monthly`.
    pub day_of_month: Option<u32>,
    pub pattern_start: NaiveDate,
    pub pattern_end: Option<NaiveDate>,
    pub employee: Option<EmployeeId>,
    pub team: Option<TeamId>,
    pub active: bool,
    /// High-water mark of the furthest date a generation run has reached;
    /// informational only, the generator always rescans from
    /// `pattern_start` so a deleted shift is regenerated on rerun.
    pub last_generated_through: Option<NaiveDate>,
}
