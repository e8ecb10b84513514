//! [`SignalForwarder`] – seat position change → `seatadjuster/currentPosition`.

use std::sync::Arc;

use futures_util::StreamExt;
use seat_hal::DataPointStream;
use seat_middleware::PubSubTransport;
use seat_types::{CURRENT_POSITION_TOPIC, PositionChangeEvent, SeatError};
use tracing::{debug, error, warn};

/// Observes the seat position data point and republishes every change as
/// `{"position": <int>}`. Holds no state besides the transport.
pub struct SignalForwarder {
    transport: Arc<dyn PubSubTransport>,
}

impl SignalForwarder {
    pub fn new(transport: Arc<dyn PubSubTransport>) -> Self {
        Self { transport }
    }

    /// Publish one observed position. Publish failures are returned, never
    /// retried.
    pub async fn on_value_change(&self, position: i32) -> Result<(), SeatError> {
        let payload = serde_json::to_string(&PositionChangeEvent { position })
            .map_err(|e| SeatError::Serialization(e.to_string()))?;
        debug!(position, "forwarding seat position");
        self.transport.publish(CURRENT_POSITION_TOPIC, payload).await
    }

    /// Drive [`on_value_change`][Self::on_value_change] from a subscription
    /// until the stream ends. Failed publishes are logged and dropped.
    pub async fn run(self, mut changes: DataPointStream) {
        while let Some(value) = changes.next().await {
            let Some(position) = value.as_i32() else {
                warn!(%value, "ignoring non-integer seat position");
                continue;
            };
            if let Err(e) = self.on_value_change(position).await {
                error!(position, error = %e, "failed to publish seat position");
            }
        }
        debug!("seat position subscription closed");
    }
}
