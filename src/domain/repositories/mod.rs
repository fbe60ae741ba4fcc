pub mod store;

pub use store::{ApplyReport, DomainStore, ShiftQuery};
