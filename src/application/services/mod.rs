pub mod conflict_service;
pub mod fairness_engine;

pub use conflict_service::ConflictService;
pub use fairness_engine::FairnessEngine;
