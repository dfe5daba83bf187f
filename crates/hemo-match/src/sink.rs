use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A notification delivery failure, as reported by the external channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("delivery failed: {0}")]
pub struct SinkError(pub String);

/// External notification channel (SMS, email, push — opaque to the core).
///
/// Implementations must tolerate concurrent sends; the orchestrator
/// dispatches one task per candidate. Retrying failed deliveries is the
/// sink's responsibility, not the caller's.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, contact: &str, message: &str) -> Result<(), SinkError>;
}

/// A notification captured by [`InMemorySink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentNotification {
    pub contact: String,
    pub message: String,
}

/// Recording sink for tests and demos.
///
/// Contacts can be configured to fail or to respond slowly, which is how
/// the dispatch-isolation behavior is exercised.
#[derive(Default)]
pub struct InMemorySink {
    sent: Mutex<Vec<SentNotification>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries to `contact` will fail.
    pub fn failing_for(mut self, contact: impl Into<String>) -> Self {
        self.failing.insert(contact.into());
        self
    }

    /// Deliveries to `contact` will stall for `delay` before succeeding.
    pub fn delayed_for(mut self, contact: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(contact.into(), delay);
        self
    }

    /// Everything delivered so far, in delivery order.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().expect("sink lock poisoned").clone()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn send(&self, contact: &str, message: &str) -> Result<(), SinkError> {
        if let Some(delay) = self.delays.get(contact) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(contact) {
            return Err(SinkError(format!("{contact} unreachable")));
        }
        self.sent
            .lock()
            .expect("sink lock poisoned")
            .push(SentNotification {
                contact: contact.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_deliveries() {
        let sink = InMemorySink::new();
        sink.send("a@example.org", "hello").await.unwrap();
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].contact, "a@example.org");
    }

    #[tokio::test]
    async fn failing_contact_errors() {
        let sink = InMemorySink::new().failing_for("down@example.org");
        let err = sink.send("down@example.org", "hello").await.unwrap_err();
        assert!(err.0.contains("unreachable"));
        assert!(sink.sent().is_empty());
    }
}
