mod emitter;
mod engine;
mod ledger;
mod rules;
mod templates;

pub use emitter::{EmailNotifier, NotificationEmitter};
pub use engine::{NotificationEngine, TickReport, DEFAULT_INTERVAL};
pub use ledger::{NotificationKey, SentLedger};
pub use rules::{due_notifications, DueNotification, Moment, Notice};
