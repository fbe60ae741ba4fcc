use serde::{Deserialize, Serialize};

/// Per-day availability classification used by `availability_matrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityState {
    Available,
    Partial,
    Unavailable,
}
