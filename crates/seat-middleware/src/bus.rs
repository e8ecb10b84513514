//! Headless, topic-keyed publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! Topics are plain strings (`"seatadjuster/currentPosition"`). A channel is
//! created the first time anyone subscribes to a topic; publishing to a topic
//! nobody listens on is a normal condition and simply reaches zero receivers.
//!
//! Besides the per-topic channels the bus keeps one global channel that sees
//! every [`Envelope`]. Bridges such as [`WsBridge`][crate::ws_bridge::WsBridge]
//! use it to mirror all traffic to external clients.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use seat_types::{Envelope, SeatError};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default channel capacity (number of buffered envelopes before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    capacity: usize,
    global: broadcast::Sender<Envelope>,
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<Envelope>>>>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (global, _) = broadcast::channel(capacity);
        Self {
            capacity,
            global,
            topics: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publish `payload` on `topic`.
    ///
    /// Returns the number of topic subscribers that were handed the envelope.
    /// Returns `Ok(0)` when nobody is currently subscribed to the topic.
    ///
    /// # Errors
    ///
    /// [`SeatError::Channel`] when `topic` is empty or contains a wildcard
    /// character (`+`, `#`).
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> Result<usize, SeatError> {
        validate_topic(topic)?;
        let envelope = Envelope::new(topic, payload);

        // The global channel has no receivers unless a bridge is attached.
        let _ = self.global.send(envelope.clone());

        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let delivered = match topics.get(topic) {
            Some(sender) => sender.send(envelope).unwrap_or(0),
            None => 0,
        };
        trace!(topic, delivered, "published");
        Ok(delivered)
    }

    /// Subscribe to a single topic.
    pub fn subscribe(&self, topic: &str) -> TopicReceiver {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let sender = topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        TopicReceiver {
            topic: topic.to_string(),
            receiver: sender.subscribe(),
        }
    }

    /// Subscribe to every envelope published on the bus, whatever its topic.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Envelope> {
        self.global.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn validate_topic(topic: &str) -> Result<(), SeatError> {
    if topic.is_empty() {
        return Err(SeatError::Channel("topic must not be empty".to_string()));
    }
    if topic.contains(['+', '#']) {
        return Err(SeatError::Channel(format!(
            "cannot publish to wildcard topic '{topic}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Topic receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single topic.
///
/// Obtained via [`EventBus::subscribe`].
pub struct TopicReceiver {
    topic: String,
    receiver: broadcast::Receiver<Envelope>,
}

impl TopicReceiver {
    /// Wait for the next envelope on this topic.
    ///
    /// A subscriber that falls behind skips the dropped envelopes and logs a
    /// warning. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = %self.topic, lagged_by = n, "TopicReceiver lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The topic this receiver is bound to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}
