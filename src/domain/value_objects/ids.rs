//! Identifier newtypes.
//!
//! The in-memory store hands these out as monotonic counters per
//! aggregate; none of the entities carry a natural unique key of their
//! own to reuse instead.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(EmployeeId);
id_type!(TeamId);
id_type!(DepartmentId);
id_type!(ShiftTemplateId);
id_type!(ShiftId);
id_type!(PatternId);
id_type!(LeaveRequestId);
id_type!(SwapRequestId);
id_type!(SwapRuleId);
id_type!(ChainStepId);
id_type!(DelegationId);
id_type!(AuditId);
id_type!(NotificationId);

/// A tag naming a qualification a shift can require and an employee can
/// hold (distinct from shift-class availability flags).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Skill(pub String);

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Skill {
    fn from(s: &str) -> Self {
        Skill(s.to_string())
    }
}
