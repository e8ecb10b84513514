//! [`SeatAdjusterApp`] – wires the forwarder and responder to the broker and
//! the transport.
//!
//! On start the app subscribes once to the seat position and spawns a
//! [`SignalForwarder`] on the resulting stream, then registers a
//! [`CommandResponder`] for `seatadjuster/setPosition/request` with a
//! [`TopicRouter`]. Both run until the shutdown signal fires. In-flight
//! request handlers are not drained.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use seat_hal::SimVehicle;
//! use seat_middleware::EventBus;
//! use seat_runtime::SeatAdjusterApp;
//!
//! # async fn demo() -> Result<(), seat_types::SeatError> {
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! let app = SeatAdjusterApp::new(Arc::new(SimVehicle::new()), Arc::new(EventBus::default()));
//! app.run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use seat_hal::DataPointAccess;
use seat_middleware::{PubSubTransport, TopicRouter};
use seat_types::{DataPoint, SET_POSITION_REQUEST_TOPIC, SeatError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::forwarder::SignalForwarder;
use crate::responder::CommandResponder;

pub struct SeatAdjusterApp {
    vehicle: Arc<dyn DataPointAccess>,
    transport: Arc<dyn PubSubTransport>,
}

/// Running tasks of a started [`SeatAdjusterApp`].
pub struct AppHandle {
    forwarder: JoinHandle<()>,
    router: JoinHandle<()>,
}

impl AppHandle {
    /// Wait for the router to stop, then stop forwarding.
    pub async fn join(self) -> Result<(), SeatError> {
        let result = self.router.await;
        self.forwarder.abort();
        result.map_err(|e| SeatError::Channel(format!("router task failed: {e}")))?;
        info!("seat adjuster app stopped");
        Ok(())
    }
}

impl SeatAdjusterApp {
    pub fn new(vehicle: Arc<dyn DataPointAccess>, transport: Arc<dyn PubSubTransport>) -> Self {
        Self { vehicle, transport }
    }

    /// Subscribe to the seat position and start forwarding changes.
    async fn on_start(&self) -> Result<JoinHandle<()>, SeatError> {
        let changes = self.vehicle.subscribe(DataPoint::SeatPosition).await?;
        info!(point = %DataPoint::SeatPosition, "subscribed");
        let forwarder = SignalForwarder::new(Arc::clone(&self.transport));
        Ok(tokio::spawn(forwarder.run(changes)))
    }

    fn router(&self) -> TopicRouter {
        let mut router = TopicRouter::new();
        router.register(
            SET_POSITION_REQUEST_TOPIC,
            Arc::new(CommandResponder::new(
                Arc::clone(&self.vehicle),
                Arc::clone(&self.transport),
            )),
        );
        router
    }

    /// Start the app. Once this returns, the position subscription and the
    /// request topic subscription are both in place.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> Result<AppHandle, SeatError> {
        info!("Starting seat adjuster app...");
        let forwarder = self.on_start().await?;
        let router = self.router().spawn(Arc::clone(&self.transport), shutdown);
        Ok(AppHandle { forwarder, router })
    }

    /// Start the app and run until `shutdown` fires.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), SeatError> {
        self.start(shutdown).await?.join().await
    }
}
