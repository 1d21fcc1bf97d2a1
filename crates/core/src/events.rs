//! Outbound mutation notifications.
//!
//! The library fires an event after every successful mutation; who observes
//! them (audit log, web hooks, nothing at all) is the caller's business.

use log::info;

/// Notification fired after a successful library mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontEvent {
    /// A font was converted or installed into the library.
    Created { identifier: String },
    /// A font was removed from the library.
    Deleted { identifier: String },
}

/// Observer for library mutations.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &FontEvent);
}

/// Default sink: records events on the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: &FontEvent) {
        match event {
            FontEvent::Created { identifier } => info!("font created: {identifier}"),
            FontEvent::Deleted { identifier } => info!("font deleted: {identifier}"),
        }
    }
}
