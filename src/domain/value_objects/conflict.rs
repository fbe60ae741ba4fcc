use serde::{Deserialize, Serialize};

use super::ids::ShiftId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictKind {
    DoubleBooking {
        conflicting_shift: ShiftId,
        overlap_hours: f64,
    },
    LeaveConflict {
        leave_request: crate::domain::value_objects::ids::LeaveRequestId,
    },
    OverScheduledWeek {
        hours: f64,
        limit: f64,
    },
    OverScheduledMonth {
        hours: f64,
        limit: f64,
    },
    SkillMismatch {
        missing: Vec<crate::domain::value_objects::ids::Skill>,
    },
}

/// A single detected conflict, always attached to the shift it was found
/// against. Evaluation is deterministic and independent of enumeration
/// order — callers must not rely on the order conflicts are returned in
/// beyond what `detect_shift_conflicts` documents (grouped by shift id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub shift_id: ShiftId,
    pub severity: Severity,
    pub kind: ConflictKind,
}

impl Conflict {
    pub fn severity_for_kind(kind: &ConflictKind, high_severity_leave: bool) -> Severity {
        match kind {
            ConflictKind::DoubleBooking { .. } => Severity::High,
            ConflictKind::LeaveConflict { .. } => {
                if high_severity_leave {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            ConflictKind::OverScheduledWeek { .. } => Severity::Medium,
            ConflictKind::OverScheduledMonth { .. } => Severity::Low,
            ConflictKind::SkillMismatch { .. } => Severity::Medium,
        }
    }
}
