//! Bulk shift operations.
//!
//! Create-from-template, reassign, retime, and delete over an arbitrary
//! set of shifts, each with a `dry_run` mode that reports the prospective
//! effect and conflict set without writing. Writes that do proceed go
//! through the same per-shift checks `ConflictService` would report,
//! rather than silently overwriting a double-booking.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::capabilities::{Permission, PermissionChecker};
use crate::domain::entities::Shift;
use crate::domain::errors::{CoreError, CoreResult, CorrelationId, Outcome};
use crate::domain::repositories::DomainStore;
use crate::domain::value_objects::{Conflict, EmployeeId, ShiftId, ShiftStatus};
use crate::Config;

const OP_CREATE: &str = "bulk_ops.bulk_create_from_template";
const OP_ASSIGN: &str = "bulk_ops.bulk_assign_employee";
const OP_RETIME: &str = "bulk_ops.bulk_modify_times";
const OP_DELETE: &str = "bulk_ops.bulk_delete";

/// `set` replaces both ends outright; `offset` shifts both ends by the
/// same duration, preserving the shift's length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TimeChange {
    Set { start: DateTime<Utc>, end: DateTime<Utc> },
    Offset(Duration),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BulkReport {
    pub affected: Vec<ShiftId>,
    pub conflicts: Vec<Conflict>,
}

pub struct BulkShiftOps<'a> {
    store: &'a dyn DomainStore,
    config: &'a Config,
    permissions: &'a dyn PermissionChecker,
}

impl<'a> BulkShiftOps<'a> {
    pub fn new(store: &'a dyn DomainStore, config: &'a Config, permissions: &'a dyn PermissionChecker) -> Self {
        Self { store, config, permissions }
    }

    fn correlation(op: &'static str, actor: EmployeeId) -> CorrelationId {
        CorrelationId::new(format!("{op}-{actor}"))
    }

    fn require(&self, actor: EmployeeId, permission: Permission, op: &'static str) -> CoreResult<()> {
        if self.permissions.has(actor, permission) {
            Ok(())
        } else {
            Err(CoreError::permission_denied(op, Self::correlation(op, actor), permission.key()))
        }
    }

    fn conflicts_for(&self, shift: &Shift, exclude: Option<ShiftId>) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for overlap in self
            .store
            .overlapping_shifts(shift.employee_id, shift.start, shift.end, exclude)
        {
            if overlap.status.is_cancelled() {
                continue;
            }
            conflicts.push(Conflict {
                shift_id: shift.id,
                severity: crate::domain::value_objects::Severity::High,
                kind: crate::domain::value_objects::ConflictKind::DoubleBooking {
                    conflicting_shift: overlap.id,
                    overlap_hours: shift.duration_hours().min(overlap.duration_hours()),
                },
            });
        }
        for leave in self
            .store
            .leave_requests_overlapping(shift.employee_id, shift.start.date_naive(), shift.end.date_naive())
            .into_iter()
            .filter(|l| l.status == crate::domain::value_objects::LeaveStatus::Approved)
        {
            conflicts.push(Conflict {
                shift_id: shift.id,
                severity: crate::domain::value_objects::Severity::High,
                kind: crate::domain::value_objects::ConflictKind::LeaveConflict { leave_request: leave.id },
            });
        }
        conflicts
    }

    /// Materializes `count` shifts from `template` for `employee`, each
    /// `default_start`/`default_end` anchored on the given dates.
    pub fn bulk_create_from_template(
        &self,
        actor: EmployeeId,
        template_id: crate::domain::value_objects::ShiftTemplateId,
        employee_id: EmployeeId,
        dates: &[chrono::NaiveDate],
        force: bool,
        dry_run: bool,
    ) -> CoreResult<Outcome<BulkReport>> {
        self.require(actor, Permission::CreateShift, OP_CREATE)?;
        let corr = Self::correlation(OP_CREATE, actor);

        let template = self.store.get_template(template_id).ok_or_else(|| {
            CoreError::not_found(OP_CREATE, corr.clone(), "shift_template", template_id.to_string())
        })?;

        let mut drafts = Vec::new();
        let mut conflicts = Vec::new();
        for date in dates {
            let start = Utc.from_utc_datetime(&date.and_time(template.default_start));
            let end = if template.default_end <= template.default_start {
                Utc.from_utc_datetime(&(*date + Duration::days(1)).and_time(template.default_end))
            } else {
                Utc.from_utc_datetime(&date.and_time(template.default_end))
            };

            let draft = Shift {
                id: self.store.next_shift_id(),
                template_id,
                employee_id,
                class: template.class,
                start,
                end,
                status: ShiftStatus::Scheduled,
                notes: None,
                auto_assigned: false,
                reason: Some("bulk create".to_string()),
            };
            conflicts.extend(self.conflicts_for(&draft, None));
            drafts.push(draft);
        }

        if dry_run {
            let report = BulkReport { affected: drafts.iter().map(|d| d.id).collect(), conflicts: conflicts.clone() };
            return Ok(Outcome::with_warnings(report, conflicts));
        }
        if !conflicts.is_empty() && !force {
            return Err(CoreError::blocking(OP_CREATE, corr, "bulk create would double-book", conflicts));
        }

        let ids = self.store.apply_generated_shifts(drafts)?;
        let report = BulkReport { affected: ids, conflicts: conflicts.clone() };
        if conflicts.is_empty() {
            Ok(Outcome::clean(report))
        } else {
            Ok(Outcome::with_warnings(report, conflicts))
        }
    }

    pub fn bulk_assign_employee(
        &self,
        actor: EmployeeId,
        shift_ids: &[ShiftId],
        employee_id: EmployeeId,
        force: bool,
        dry_run: bool,
    ) -> CoreResult<Outcome<BulkReport>> {
        self.require(actor, Permission::EditShift, OP_ASSIGN)?;
        let corr = Self::correlation(OP_ASSIGN, actor);

        let mut updated = Vec::new();
        let mut conflicts = Vec::new();
        for id in shift_ids {
            let mut shift = self.store.get_shift(*id).ok_or_else(|| {
                CoreError::not_found(OP_ASSIGN, corr.clone(), "shift", id.to_string())
            })?;
            if shift.status.blocks_swap() {
                return Err(CoreError::blocking(
                    OP_ASSIGN,
                    corr.clone(),
                    "shift is not open to reassignment",
                    Vec::new(),
                ));
            }
            shift.employee_id = employee_id;
            conflicts.extend(self.conflicts_for(&shift, Some(shift.id)));
            updated.push(shift);
        }

        if dry_run {
            let report = BulkReport { affected: updated.iter().map(|s| s.id).collect(), conflicts: conflicts.clone() };
            return Ok(Outcome::with_warnings(report, conflicts));
        }
        if !conflicts.is_empty() && !force {
            return Err(CoreError::blocking(OP_ASSIGN, corr, "reassignment would double-book", conflicts));
        }

        for shift in &updated {
            self.store.update_shift(shift.clone())?;
        }
        let report = BulkReport { affected: updated.iter().map(|s| s.id).collect(), conflicts: conflicts.clone() };
        if conflicts.is_empty() {
            Ok(Outcome::clean(report))
        } else {
            Ok(Outcome::with_warnings(report, conflicts))
        }
    }

    pub fn bulk_modify_times(
        &self,
        actor: EmployeeId,
        shift_ids: &[ShiftId],
        change: TimeChange,
        force: bool,
        dry_run: bool,
    ) -> CoreResult<Outcome<BulkReport>> {
        self.require(actor, Permission::EditShift, OP_RETIME)?;
        let corr = Self::correlation(OP_RETIME, actor);

        let mut updated = Vec::new();
        let mut conflicts = Vec::new();
        for id in shift_ids {
            let mut shift = self.store.get_shift(*id).ok_or_else(|| {
                CoreError::not_found(OP_RETIME, corr.clone(), "shift", id.to_string())
            })?;
            if shift.status.blocks_swap() {
                return Err(CoreError::blocking(OP_RETIME, corr.clone(), "shift is not open to retiming", Vec::new()));
            }
            match &change {
                TimeChange::Set { start, end } => {
                    shift.start = *start;
                    shift.end = *end;
                }
                TimeChange::Offset(delta) => {
                    shift.start += *delta;
                    shift.end += *delta;
                }
            }
            if shift.end <= shift.start {
                return Err(CoreError::validation(OP_RETIME, corr.clone(), "end", "must fall after start"));
            }
            let iso = shift.start.date_naive().iso_week();
            let weekly_hours = self
                .store
                .hours_for_iso_week(shift.employee_id, iso.year(), iso.week());
            if weekly_hours > self.config.max_weekly_hours {
                conflicts.push(Conflict {
                    shift_id: shift.id,
                    severity: crate::domain::value_objects::Severity::Medium,
                    kind: crate::domain::value_objects::ConflictKind::OverScheduledWeek {
                        hours: weekly_hours,
                        limit: self.config.max_weekly_hours,
                    },
                });
            }
            conflicts.extend(self.conflicts_for(&shift, Some(shift.id)));
            updated.push(shift);
        }

        if dry_run {
            let report = BulkReport { affected: updated.iter().map(|s| s.id).collect(), conflicts: conflicts.clone() };
            return Ok(Outcome::with_warnings(report, conflicts));
        }
        if !conflicts.is_empty() && !force {
            return Err(CoreError::blocking(OP_RETIME, corr, "retiming would double-book", conflicts));
        }

        for shift in &updated {
            self.store.update_shift(shift.clone())?;
        }
        let report = BulkReport { affected: updated.iter().map(|s| s.id).collect(), conflicts: conflicts.clone() };
        if conflicts.is_empty() {
            Ok(Outcome::clean(report))
        } else {
            Ok(Outcome::with_warnings(report, conflicts))
        }
    }

    /// `force` bypasses nothing here beyond the overlap check implied by
    /// deletion freeing up a slot; a `completed` shift is always refused,
    /// regardless of `force` (the store enforces this directly).
    pub fn bulk_delete(
        &self,
        actor: EmployeeId,
        shift_ids: &[ShiftId],
        dry_run: bool,
    ) -> CoreResult<Outcome<BulkReport>> {
        self.require(actor, Permission::DeleteShift, OP_DELETE)?;
        let corr = Self::correlation(OP_DELETE, actor);

        let conflicts = Vec::new();
        for id in shift_ids {
            if self.store.get_shift(*id).is_none() {
                return Err(CoreError::not_found(OP_DELETE, corr.clone(), "shift", id.to_string()));
            }
        }

        if dry_run {
            let report = BulkReport { affected: shift_ids.to_vec(), conflicts: conflicts.clone() };
            return Ok(Outcome::with_warnings(report, conflicts));
        }

        for id in shift_ids {
            self.store.delete_shift(*id)?;
        }
        Ok(Outcome::clean(BulkReport { affected: shift_ids.to_vec(), conflicts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Employee, ShiftTemplate};
    use crate::domain::value_objects::{ShiftClass, ShiftTemplateId};
    use crate::infrastructure::memory_store::InMemoryDomainStore;
    use chrono::{NaiveDate, NaiveTime};

    struct AllowAll;
    impl PermissionChecker for AllowAll {
        fn has(&self, _actor: EmployeeId, _permission: Permission) -> bool {
            true
        }
    }

    fn seed(store: &InMemoryDomainStore) {
        store
            .add_employee(Employee::new(EmployeeId(1), "E1", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))
            .unwrap();
        store
            .add_template(ShiftTemplate::new(
                ShiftTemplateId(1),
                "Changes",
                ShiftClass::Changes,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            ))
            .unwrap();
    }

    #[test]
    fn bulk_create_dry_run_does_not_write() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let permissions = AllowAll;
        seed(&store);

        let ops = BulkShiftOps::new(&store, &config, &permissions);
        let dates = [NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()];
        let outcome = ops
            .bulk_create_from_template(EmployeeId(1), ShiftTemplateId(1), EmployeeId(1), &dates, false, true)
            .unwrap();
        assert_eq!(outcome.value.affected.len(), 1);
        assert!(store.list_employees()[0].id == EmployeeId(1));
        assert!(store
            .shifts(&crate::domain::repositories::ShiftQuery::default())
            .is_empty());
    }

    #[test]
    fn bulk_create_then_delete_round_trips() {
        let store = InMemoryDomainStore::new();
        let config = Config::default();
        let permissions = AllowAll;
        seed(&store);

        let ops = BulkShiftOps::new(&store, &config, &permissions);
        let dates = [NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()];
        let outcome = ops
            .bulk_create_from_template(EmployeeId(1), ShiftTemplateId(1), EmployeeId(1), &dates, false, false)
            .unwrap();
        assert_eq!(outcome.value.affected.len(), 1);

        let deleted = ops.bulk_delete(EmployeeId(1), &outcome.value.affected, false).unwrap();
        assert_eq!(deleted.value.affected.len(), 1);
        assert!(store
            .shifts(&crate::domain::repositories::ShiftQuery::default())
            .is_empty());
    }
}
