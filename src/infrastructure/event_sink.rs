//! In-memory Event Sink and Email Queue.
//!
//! Turns a `DomainEvent` into a stored `NotificationEvent` and, subject
//! to the recipient's `NotificationPreference`, an enqueued email. Quiet
//! hours delay the email channel but never the in-app one; a disabled
//! per-class preference drops that channel outright.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::capabilities::event_sink::{DomainEvent, EmailPayload, EmailQueue, EventSink};
use crate::domain::entities::NotificationEvent;
use crate::domain::repositories::DomainStore;
use crate::domain::value_objects::EmployeeId;

/// Renders an event's title/body for notification and email payloads.
/// Kept here rather than on `DomainEvent` because the wording is a
/// presentation concern, not a domain one.
fn render(event: &DomainEvent) -> (String, String) {
    match event {
        DomainEvent::ShiftAssigned { shift, .. } => (
            "New shift assigned".to_string(),
            format!("You have been assigned shift #{shift}."),
        ),
        DomainEvent::ShiftCancelled { shift, .. } => (
            "Shift cancelled".to_string(),
            format!("Shift #{shift} has been cancelled."),
        ),
        DomainEvent::SwapSubmitted { swap_request, .. } => (
            "Swap request submitted".to_string(),
            format!("Swap request #{swap_request} has been submitted."),
        ),
        DomainEvent::SwapChainStepPending { swap_request, .. } => (
            "Swap approval needed".to_string(),
            format!("Swap request #{swap_request} is waiting on your decision."),
        ),
        DomainEvent::SwapDecided {
            swap_request,
            approved,
        } => {
            let verb = if *approved { "approved" } else { "rejected" };
            (
                format!("Swap request {verb}"),
                format!("Swap request #{swap_request} was {verb}."),
            )
        }
        DomainEvent::LeaveSubmitted { leave_request, .. } => (
            "Leave request submitted".to_string(),
            format!("Leave request #{leave_request} has been submitted."),
        ),
        DomainEvent::LeaveDecided {
            leave_request,
            approved,
        } => {
            let verb = if *approved { "approved" } else { "rejected" };
            (
                format!("Leave request {verb}"),
                format!("Leave request #{leave_request} was {verb}."),
            )
        }
    }
}

/// Wires a `DomainEvent` to the store (for the in-app notification row)
/// and to an `EmailQueue` (for best-effort email delivery), gated by
/// each recipient's `NotificationPreference`.
pub struct InMemoryEventSink<'a> {
    store: &'a dyn DomainStore,
    email_queue: &'a dyn EmailQueue,
}

impl<'a> InMemoryEventSink<'a> {
    pub fn new(store: &'a dyn DomainStore, email_queue: &'a dyn EmailQueue) -> Self {
        Self { store, email_queue }
    }
}

impl<'a> EventSink for InMemoryEventSink<'a> {
    fn emit(&self, event: DomainEvent, recipient: EmployeeId, occurred_at: DateTime<Utc>) {
        let class = event.notification_class();
        let preference = self.store.get_preference(recipient);
        let (title, body) = render(&event);

        let in_app = preference.in_app_enabled_for(class);
        let email_allowed = preference.email_enabled_for(class);
        let in_quiet_hours = preference.in_quiet_hours(occurred_at.time());

        if in_app {
            let notification = NotificationEvent {
                id: self.store.next_notification_id(),
                recipient,
                class,
                title: title.clone(),
                body: body.clone(),
                action_link: None,
                shift: shift_ref(&event),
                leave_request: leave_ref(&event),
                swap_request: swap_ref(&event),
                channel_email: email_allowed && !in_quiet_hours,
                channel_in_app: true,
                read: false,
                created_at: occurred_at,
            };
            if let Err(err) = self.store.add_notification(notification) {
                warn!(?err, "failed to persist in-app notification");
            }
        }

        if email_allowed && !in_quiet_hours {
            self.email_queue.enqueue(EmailPayload {
                recipient,
                subject: title,
                body,
                queued_at: occurred_at,
            });
        }
    }
}

fn shift_ref(event: &DomainEvent) -> Option<crate::domain::value_objects::ShiftId> {
    match event {
        DomainEvent::ShiftAssigned { shift, .. } | DomainEvent::ShiftCancelled { shift, .. } => {
            Some(*shift)
        }
        _ => None,
    }
}

fn leave_ref(event: &DomainEvent) -> Option<crate::domain::value_objects::LeaveRequestId> {
    match event {
        DomainEvent::LeaveSubmitted { leave_request, .. }
        | DomainEvent::LeaveDecided { leave_request, .. } => Some(*leave_request),
        _ => None,
    }
}

fn swap_ref(event: &DomainEvent) -> Option<crate::domain::value_objects::SwapRequestId> {
    match event {
        DomainEvent::SwapSubmitted { swap_request, .. }
        | DomainEvent::SwapChainStepPending { swap_request, .. }
        | DomainEvent::SwapDecided { swap_request, .. } => Some(*swap_request),
        _ => None,
    }
}

/// Logs every payload and records it for test assertions. A real
/// deployment swaps this for an SMTP or transactional-email client
/// behind the same `EmailQueue` trait; delivery failures here are
/// logged, never escalated to the caller.
#[derive(Default)]
pub struct LoggingEmailQueue {
    sent: Mutex<Vec<EmailPayload>>,
}

impl LoggingEmailQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailPayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailQueue for LoggingEmailQueue {
    fn enqueue(&self, payload: EmailPayload) {
        tracing::info!(recipient = ?payload.recipient, subject = %payload.subject, "email queued");
        self.sent.lock().unwrap().push(payload);
    }
}
