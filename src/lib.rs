pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod config;

pub use domain::entities;
pub use domain::value_objects;
pub use domain::errors::{CoreError, CoreErrorKind, CorrelationId};
pub use config::Config;
