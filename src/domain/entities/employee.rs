//! Employee entity.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EmployeeId, ShiftClass, Skill, TeamId};

/// An engineer eligible for scheduling. A data carrier only — business
/// rules that consult an employee live in the application services, not
/// here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub display_name: String,
    /// At most one team. Enforced by the store, not by this type.
    pub team: Option<TeamId>,
    pub skills: HashSet<Skill>,
    /// `0 < fte <= 1`.
    pub fte: f64,
    pub hire_date: NaiveDate,
    pub active: bool,
    pub available_for_incidents: bool,
    pub available_for_waakdienst: bool,
}

impl Employee {
    pub fn new(id: EmployeeId, display_name: impl Into<String>, hire_date: NaiveDate) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            team: None,
            skills: HashSet::new(),
            fte: 1.0,
            hire_date,
            active: true,
            available_for_incidents: true,
            available_for_waakdienst: true,
        }
    }

    /// Eligibility flag consulted by the orchestrator and fairness engine
    /// for `incidents`/`waakdienst`. `changes`/`project` carry no
    /// dedicated flag in the data model, so any active employee is
    /// eligible for them by default.
    pub fn available_for_class(&self, class: ShiftClass) -> bool {
        match class {
            ShiftClass::Incidents => self.available_for_incidents,
            ShiftClass::Waakdienst => self.available_for_waakdienst,
            ShiftClass::Changes | ShiftClass::Project => true,
        }
    }

    pub fn tenure_months(&self, as_of: NaiveDate) -> i64 {
        let years = as_of.year() - self.hire_date.year();
        let months = as_of.month() as i64 - self.hire_date.month() as i64;
        let mut total = years as i64 * 12 + months;
        if as_of.day() < self.hire_date.day() {
            total -= 1;
        }
        total.max(0)
    }

    pub fn has_skills(&self, required: &HashSet<Skill>) -> bool {
        required.is_subset(&self.skills)
    }
}

use chrono::Datelike;
