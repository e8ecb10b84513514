//! The pub/sub seam.
//!
//! Application components never talk to a concrete broker. They publish and
//! subscribe through [`PubSubTransport`], which the in-process
//! [`EventBus`] implements. Tests substitute recording doubles.

use async_trait::async_trait;
use seat_types::SeatError;

use crate::bus::{EventBus, TopicReceiver};

/// Topic-based publish/subscribe transport.
#[async_trait]
pub trait PubSubTransport: Send + Sync {
    /// Publish a UTF-8 JSON `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: String) -> Result<(), SeatError>;

    /// Subscribe to every message published on `topic` from now on.
    fn subscribe(&self, topic: &str) -> TopicReceiver;
}

#[async_trait]
impl PubSubTransport for EventBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), SeatError> {
        EventBus::publish(self, topic, payload).map(|_| ())
    }

    fn subscribe(&self, topic: &str) -> TopicReceiver {
        EventBus::subscribe(self, topic)
    }
}
