pub mod memory_store;
pub mod event_sink;

pub use memory_store::InMemoryDomainStore;
pub use event_sink::InMemoryEventSink;
