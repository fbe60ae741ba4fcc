pub mod ids;
pub mod shift_class;
pub mod statuses;
pub mod conflict;
pub mod availability;

pub use ids::*;
pub use shift_class::ShiftClass;
pub use statuses::*;
pub use conflict::{Conflict, ConflictKind, Severity};
pub use availability::AvailabilityState;
