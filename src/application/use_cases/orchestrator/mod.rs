//! Shift Orchestrator.
//!
//! Drives per-class shift generation over a window, respecting
//! availability, leave, and the Fairness Engine's ledger, then applies
//! the result atomically through the Domain Store. Per-class generators
//! run sequentially in a fixed order (incidents, waakdienst, others) so
//! that cross-class invariants — no Employee holds both incidents and
//! waakdienst in the same ISO week — can be checked as they go.

mod generators;
pub mod recurring;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::capabilities::{EventSink, Permission, PermissionChecker};
use crate::domain::entities::Shift;
use crate::domain::errors::{CoreError, CoreResult, CorrelationId, Outcome};
use crate::domain::repositories::DomainStore;
use crate::domain::value_objects::{Conflict, EmployeeId, ShiftClass, ShiftId, ShiftStatus, TeamId};
use crate::Config;

use self::generators::{generate_changes_or_project, generate_incidents, generate_waakdienst};

pub use self::generators::ProposedShift;
pub use self::recurring::RecurringPatternGenerator;

const OP_PREVIEW: &str = "orchestrator.preview";
const OP_APPLY: &str = "orchestrator.apply";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreviewReport {
    pub created: Vec<ProposedShift>,
    pub unassigned: Vec<(chrono::NaiveDate, ShiftClass, String)>,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrchestratorApplyReport {
    pub created: Vec<ShiftId>,
    pub unassigned: Vec<(chrono::NaiveDate, ShiftClass, String)>,
    pub conflicts: Vec<Conflict>,
}

pub struct ShiftOrchestrator<'a> {
    store: &'a dyn DomainStore,
    config: &'a Config,
    permissions: &'a dyn PermissionChecker,
    event_sink: &'a dyn EventSink,
}

impl<'a> ShiftOrchestrator<'a> {
    pub fn new(
        store: &'a dyn DomainStore,
        config: &'a Config,
        permissions: &'a dyn PermissionChecker,
        event_sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            store,
            config,
            permissions,
            event_sink,
        }
    }

    /// Fixed generation order: invariants that span classes (no Employee
    /// on both incidents and waakdienst the same ISO week) can only be
    /// checked if incidents runs before waakdienst.
    fn ordered_classes(requested: &[ShiftClass]) -> Vec<ShiftClass> {
        [
            ShiftClass::Incidents,
            ShiftClass::Waakdienst,
            ShiftClass::Changes,
            ShiftClass::Project,
        ]
        .into_iter()
        .filter(|c| requested.contains(c))
        .collect()
    }

    fn build(
        &self,
        window: (DateTime<Utc>, DateTime<Utc>),
        classes: &[ShiftClass],
        team: TeamId,
        force: bool,
    ) -> CoreResult<PreviewReport> {
        let mut report = PreviewReport::default();
        let mut incidents_employee_by_week: HashMap<(i32, u32), EmployeeId> = HashMap::new();

        for class in Self::ordered_classes(classes) {
            match class {
                ShiftClass::Incidents => {
                    let (proposed, unassigned, conflicts) = generate_incidents(
                        self.store,
                        self.config,
                        window,
                        team,
                        force,
                        &mut incidents_employee_by_week,
                    );
                    report.created.extend(proposed);
                    report.unassigned.extend(unassigned);
                    report.conflicts.extend(conflicts);
                }
                ShiftClass::Waakdienst => {
                    let (proposed, unassigned, conflicts) = generate_waakdienst(
                        self.store,
                        self.config,
                        window,
                        team,
                        force,
                        &incidents_employee_by_week,
                    );
                    report.created.extend(proposed);
                    report.unassigned.extend(unassigned);
                    report.conflicts.extend(conflicts);
                }
                ShiftClass::Changes | ShiftClass::Project => {
                    let (proposed, unassigned, conflicts) = generate_changes_or_project(
                        self.store,
                        self.config,
                        window,
                        team,
                        class,
                        force,
                        &incidents_employee_by_week,
                    );
                    report.created.extend(proposed);
                    report.unassigned.extend(unassigned);
                    report.conflicts.extend(conflicts);
                }
            }
        }

        Ok(report)
    }

    /// Performs no writes.
    pub fn preview(
        &self,
        window: (DateTime<Utc>, DateTime<Utc>),
        classes: &[ShiftClass],
        team: TeamId,
    ) -> CoreResult<PreviewReport> {
        self.build(window, classes, team, false)
    }

    /// Writes every produced shift atomically; a fatal generator error
    /// leaves the store untouched. Per-assignment fairness-consultation
    /// failures (no eligible Employee for a day) are recorded as
    /// `unassigned` rows, not raised.
    pub fn apply(
        &self,
        window: (DateTime<Utc>, DateTime<Utc>),
        classes: &[ShiftClass],
        team: TeamId,
        force: bool,
        actor: EmployeeId,
    ) -> CoreResult<Outcome<OrchestratorApplyReport>> {
        if !self.permissions.has(actor, Permission::RunOrchestrator) {
            return Err(CoreError::permission_denied(
                OP_APPLY,
                CorrelationId::new(format!("apply-{actor}")),
                Permission::RunOrchestrator.key(),
            ));
        }

        let preview = self.build(window, classes, team, force)?;

        let shifts: Vec<Shift> = preview
            .created
            .iter()
            .map(|p| Shift {
                id: self.store.next_shift_id(),
                template_id: p.template_id,
                employee_id: p.employee_id,
                class: p.class,
                start: p.start,
                end: p.end,
                status: ShiftStatus::Scheduled,
                notes: None,
                auto_assigned: true,
                reason: Some(p.reason.clone()),
            })
            .collect();

        let created_ids = self.store.apply_generated_shifts(shifts.clone())?;

        for shift in &shifts {
            self.event_sink.emit(
                crate::domain::capabilities::event_sink::DomainEvent::ShiftAssigned {
                    shift: shift.id,
                    employee: shift.employee_id,
                },
                shift.employee_id,
                Utc::now(),
            );
        }

        let report = OrchestratorApplyReport {
            created: created_ids,
            unassigned: preview.unassigned,
            conflicts: preview.conflicts.clone(),
        };

        if preview.conflicts.is_empty() {
            Ok(Outcome::clean(report))
        } else {
            let warnings = preview.conflicts;
            Ok(Outcome::with_warnings(report, warnings))
        }
    }
}
