pub mod clock;
pub mod permissions;
pub mod event_sink;
pub mod escalation;

pub use clock::{Clock, FrozenClock, SystemClock};
pub use permissions::{Permission, PermissionChecker};
pub use event_sink::{DomainEvent, EmailPayload, EmailQueue, EventSink};
pub use escalation::{EscalationResolver, NullEscalationResolver};
