//! SwapRequest entity.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EmployeeId, ShiftId, SwapRequestId, SwapStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapRequest {
    pub id: SwapRequestId,
    pub requesting_employee: EmployeeId,
    pub target_employee: Option<EmployeeId>,
    pub requesting_shift: ShiftId,
    /// One-way swaps (no reciprocal shift) are permitted.
    pub target_shift: Option<ShiftId>,
    pub reason: Option<String>,
    pub status: SwapStatus,
    pub version: u64,
}

impl SwapRequest {
    pub fn is_one_way(&self) -> bool {
        self.target_shift.is_none()
    }
}
