pub mod services;
pub mod use_cases;

pub use services::{ConflictService, FairnessEngine};
