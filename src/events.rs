//! Domain events
//!
//! Mutations on interests are announced on an in-process broadcast bus.
//! Publishing with no subscriber attached is not an error.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 64;

/// Event topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topic {
    #[serde(rename = "interest.update")]
    InterestUpdate,
    #[serde(rename = "interest.message")]
    InterestMessage,
    #[serde(rename = "interest.delete")]
    InterestDelete,
}

impl Topic {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Topic::InterestUpdate => "interest.update",
            Topic::InterestMessage => "interest.message",
            Topic::InterestDelete => "interest.delete",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event with its payload (the affected record)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEvent {
    pub topic: Topic,
    pub payload: Value,
}

/// In-process publish/subscribe bus
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, topic: Topic, payload: Value) -> usize {
        let delivered = self
            .sender
            .send(DomainEvent { topic, payload })
            .unwrap_or(0);
        trace!(topic = %topic, delivered, "Published event");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}
