//! Team and Department entities.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DepartmentId, EmployeeId, TeamId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// Weakly references Employees and a Department — no ownership. The
/// invariant that an Employee appears in at most one Team lives on
/// `Employee.team`, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub department: Option<DepartmentId>,
    pub manager: Option<EmployeeId>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            department: None,
            manager: None,
        }
    }
}
