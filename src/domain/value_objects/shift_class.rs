use serde::{Deserialize, Serialize};

/// Drives which fairness ledger and generator a shift belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftClass {
    Incidents,
    Waakdienst,
    Changes,
    Project,
}

impl ShiftClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftClass::Incidents => "incidents",
            ShiftClass::Waakdienst => "waakdienst",
            ShiftClass::Changes => "changes",
            ShiftClass::Project => "project",
        }
    }

    pub const ALL: [ShiftClass; 4] = [
        ShiftClass::Incidents,
        ShiftClass::Waakdienst,
        ShiftClass::Changes,
        ShiftClass::Project,
    ];
}

impl std::fmt::Display for ShiftClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
