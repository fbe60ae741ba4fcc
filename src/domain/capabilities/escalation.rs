//! Escalation-role resolution capability.
//!
//! Level 1 of an approval chain is always the target Employee's Team
//! manager, resolved directly off `Team.manager`. Levels beyond that map
//! onto organization-configured escalation roles (admin role-holders,
//! department heads, ...) that the core has no native registry for, so
//! resolving them is delegated to this capability the same way RBAC
//! itself is delegated to `PermissionChecker`.

use crate::domain::value_objects::EmployeeId;

pub trait EscalationResolver: Send + Sync {
    /// Approver for chain `level` (`>= 2`) escalating from `employee`.
    /// Returns `None` if the organization has no holder configured for
    /// that level; the engine then reuses the previous level's approver
    /// rather than leaving the level unapprovable.
    fn resolve(&self, employee: EmployeeId, level: u8) -> Option<EmployeeId>;
}

/// An `EscalationResolver` with no roles configured; every level beyond
/// 1 falls back to the previous level's approver. Useful as a default
/// for organizations that only ever configure single- or dual-level
/// chains through `Team.manager` plus one admin override.
pub struct NullEscalationResolver;

impl EscalationResolver for NullEscalationResolver {
    fn resolve(&self, _employee: EmployeeId, _level: u8) -> Option<EmployeeId> {
        None
    }
}
