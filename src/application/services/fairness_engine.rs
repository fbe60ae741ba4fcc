//! Fairness Engine.
//!
//! Per-shift-class scoring and candidate-selection kernel the
//! orchestrator consults per assignment. Stateless: every call reads
//! the current ledger straight from the Domain Store rather than
//! caching, so concurrent runs always see committed state.

use chrono::NaiveDate;

use crate::domain::entities::Employee;
use crate::domain::repositories::DomainStore;
use crate::domain::value_objects::{EmployeeId, ShiftClass};

const EPSILON: f64 = 1e-9;

/// A fairness window `[start, end]`, both inclusive civil dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairnessWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FairnessWindow {
    pub fn rolling_year_containing(date: NaiveDate, window_days: i64) -> Self {
        Self {
            start: date - chrono::Duration::days(window_days / 2),
            end: date + chrono::Duration::days(window_days / 2),
        }
    }

    /// Count of civil dates in the window that count toward `class`'s
    /// ledger (weekdays only for incidents/changes, every day for
    /// waakdienst/project).
    pub fn class_days(&self, class: ShiftClass) -> i64 {
        let mut count = 0i64;
        let mut cursor = self.start;
        while cursor <= self.end {
            if counts_for_class(class, cursor) {
                count += 1;
            }
            cursor += chrono::Duration::days(1);
        }
        count
    }
}

fn counts_for_class(class: ShiftClass, date: NaiveDate) -> bool {
    use chrono::Datelike;
    match class {
        ShiftClass::Incidents | ShiftClass::Changes => {
            !matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
        }
        ShiftClass::Waakdienst | ShiftClass::Project => true,
    }
}

pub struct FairnessEngine<'a> {
    store: &'a dyn DomainStore,
}

impl<'a> FairnessEngine<'a> {
    pub fn new(store: &'a dyn DomainStore) -> Self {
        Self { store }
    }

    fn eligible_employees(&self, class: ShiftClass) -> Vec<Employee> {
        self.store
            .list_employees()
            .into_iter()
            .filter(|e| e.active && e.available_for_class(class))
            .collect()
    }

    /// `total_class_days_in_window * (employee.fte / sum_fte_eligible)`.
    pub fn expected_load(&self, employee: &Employee, class: ShiftClass, window: FairnessWindow) -> f64 {
        let eligible = self.eligible_employees(class);
        let sum_fte: f64 = eligible.iter().map(|e| e.fte).sum();
        if sum_fte <= 0.0 {
            return 0.0;
        }
        let total_days = window.class_days(class) as f64;
        total_days * (employee.fte / sum_fte)
    }

    /// Progressive over-assignment penalty, milder linear under-assignment
    /// penalty. Bounded to `[0, 100]`; higher is fairer.
    pub fn fairness_score(assigned: f64, expected: f64) -> f64 {
        let deviation = (assigned - expected) / expected.max(EPSILON);
        let score = if deviation >= 0.0 {
            100.0 - (deviation.powf(1.5) * 75.0).min(100.0)
        } else {
            100.0 - (deviation.abs() * 60.0).min(100.0)
        };
        score.clamp(0.0, 100.0)
    }

    pub fn current_score(&self, employee_id: EmployeeId, class: ShiftClass, window: FairnessWindow) -> f64 {
        let employee = match self.store.get_employee(employee_id) {
            Some(e) => e,
            None => return 0.0,
        };
        let assigned = self
            .store
            .assigned_class_days(employee_id, class, window.start, window.end) as f64;
        let expected = self.expected_load(&employee, class, window);
        Self::fairness_score(assigned, expected)
    }

    /// Deterministic candidate selection for `class` on `day`, from
    /// `eligible_candidates` (already filtered by availability flag,
    /// blocking-conflict absence, and team match by the caller).
    pub fn select_employee(
        &self,
        class: ShiftClass,
        window: FairnessWindow,
        eligible_candidates: &[EmployeeId],
    ) -> Option<EmployeeId> {
        if eligible_candidates.is_empty() {
            return None;
        }

        let employees: Vec<Employee> = eligible_candidates
            .iter()
            .filter_map(|id| self.store.get_employee(*id))
            .collect();

        let assigned: Vec<f64> = employees
            .iter()
            .map(|e| {
                self.store
                    .assigned_class_days(e.id, class, window.start, window.end) as f64
            })
            .collect();
        let expected: Vec<f64> = employees
            .iter()
            .map(|e| self.expected_load(e, class, window))
            .collect();

        let base_scores: Vec<f64> = assigned
            .iter()
            .zip(expected.iter())
            .map(|(a, e)| Self::fairness_score(*a, *e))
            .collect();

        let mut ranked: Vec<(EmployeeId, f64, f64)> = Vec::with_capacity(employees.len());

        for (i, employee) in employees.iter().enumerate() {
            let mut projected_scores = base_scores.clone();
            let projected_individual = Self::fairness_score(assigned[i] + 1.0, expected[i]);
            projected_scores[i] = projected_individual;

            let stddev = population_stddev(&projected_scores);
            let normalized_stddev = stddev.clamp(0.0, 100.0);

            let under_load_bonus =
                100.0 * ((expected[i] - assigned[i]) / expected[i].max(EPSILON)).clamp(0.0, 1.0);

            let composite = 0.60 * projected_individual
                + 0.25 * (100.0 - normalized_stddev)
                + 0.15 * under_load_bonus;

            ranked.push((employee.id, composite, assigned[i]));
        }

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.0.cmp(&b.0))
        });

        ranked.first().map(|(id, _, _)| *id)
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
