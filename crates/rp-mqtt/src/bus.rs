//! Message bus seam

use std::sync::Mutex;

/// Publish side of a message bus
///
/// Implementations must not block and must not fail loudly; a message that
/// cannot be queued is logged and dropped.
pub trait MessageBus: Send + Sync {
    fn publish(&self, topic: &str, payload: &[u8], retain: bool);
}

/// A message captured by [`MemoryBus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

impl PublishedMessage {
    /// Payload as UTF-8 text (lossy)
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// In-memory bus that records every publish, in order
#[derive(Debug, Default)]
pub struct MemoryBus {
    messages: Mutex<Vec<PublishedMessage>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Forget everything published so far
    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl MessageBus for MemoryBus {
    fn publish(&self, topic: &str, payload: &[u8], retain: bool) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(PublishedMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
                retain,
            });
        }
    }
}
