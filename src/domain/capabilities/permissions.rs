//! Permission-checking capability.
//!
//! RBAC storage itself is an external collaborator; the core only ever
//! consults `PermissionChecker.has(actor, permission)` at the start of
//! each state-changing operation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewSchedule,
    CreateShift,
    EditShift,
    DeleteShift,
    CancelShift,
    RequestSwap,
    ApproveSwap,
    CancelSwap,
    RequestLeave,
    ApproveLeave,
    CancelLeave,
    RunOrchestrator,
    ManageTeam,
    ManageUsers,
    ManageTemplates,
    ManageRecurringPatterns,
    ManageApprovalRules,
    CreateDelegation,
    ViewAudit,
    ExportData,
    ImportData,
    ManageNotificationPreferences,
}

impl Permission {
    pub fn key(&self) -> &'static str {
        match self {
            Permission::ViewSchedule => "view_schedule",
            Permission::CreateShift => "create_shift",
            Permission::EditShift => "edit_shift",
            Permission::DeleteShift => "delete_shift",
            Permission::CancelShift => "cancel_shift",
            Permission::RequestSwap => "request_swap",
            Permission::ApproveSwap => "approve_swap",
            Permission::CancelSwap => "cancel_swap",
            Permission::RequestLeave => "request_leave",
            Permission::ApproveLeave => "approve_leave",
            Permission::CancelLeave => "cancel_leave",
            Permission::RunOrchestrator => "run_orchestrator",
            Permission::ManageTeam => "manage_team",
            Permission::ManageUsers => "manage_users",
            Permission::ManageTemplates => "manage_templates",
            Permission::ManageRecurringPatterns => "manage_recurring_patterns",
            Permission::ManageApprovalRules => "manage_approval_rules",
            Permission::CreateDelegation => "create_delegation",
            Permission::ViewAudit => "view_audit",
            Permission::ExportData => "export_data",
            Permission::ImportData => "import_data",
            Permission::ManageNotificationPreferences => "manage_notification_preferences",
        }
    }
}

use crate::domain::value_objects::EmployeeId;

pub trait PermissionChecker: Send + Sync {
    fn has(&self, actor: EmployeeId, permission: Permission) -> bool;
}
