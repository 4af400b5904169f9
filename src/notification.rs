use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Destructive,
}

/// A toast for the user: title, one line of description and a severity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Destructive,
        }
    }
}

/// Fire-and-forget sink for notifications.
///
/// Sending never blocks and never fails from the caller's point of view.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn Fn(Notification) + Send + Sync>,
}

impl Notifier {
    pub fn new(sink: impl Fn(Notification) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = unbounded_channel();
        let notifier = Self::new(move |notification| {
            // Receiver dropped means nobody is left to show it to
            let _ = tx.send(notification);
        });
        (notifier, rx)
    }

    pub fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(
                "[notify] {}: {}",
                notification.title, notification.description
            ),
            Severity::Destructive => warn!(
                "[notify] {}: {}",
                notification.title, notification.description
            ),
        }
        (self.sink)(notification);
    }
}
