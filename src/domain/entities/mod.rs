pub mod employee;
pub mod team;
pub mod shift_template;
pub mod shift;
pub mod recurring_pattern;
pub mod leave_request;
pub mod swap_request;
pub mod approval;
pub mod notification;

pub use employee::Employee;
pub use team::{Department, Team};
pub use shift_template::ShiftTemplate;
pub use shift::Shift;
pub use recurring_pattern::{RecurrenceKind, RecurringShiftPattern};
pub use leave_request::LeaveRequest;
pub use swap_request::SwapRequest;
pub use approval::{ApprovalDelegation, SwapApprovalAudit, SwapApprovalChainStep, SwapApprovalRule};
pub use notification::{NotificationEvent, NotificationPreference};
