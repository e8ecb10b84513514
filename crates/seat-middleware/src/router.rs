//! [`TopicRouter`] – explicit topic → handler registration.
//!
//! Handlers are registered by topic name at startup. [`TopicRouter::spawn`]
//! subscribes to every registered topic and dispatches each inbound payload
//! to its handler on a freshly spawned task, so a handler suspended on a slow
//! broker call never holds up the next message.
//!
//! Handler errors are logged and dropped; no message is retried. On shutdown
//! the router stops accepting new messages, but handlers already in flight
//! are not cancelled.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use seat_middleware::{EventBus, TopicHandler, TopicRouter};
//! use seat_types::SeatError;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl TopicHandler for Echo {
//!     async fn handle(&self, payload: String) -> Result<(), SeatError> {
//!         println!("{payload}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! let mut router = TopicRouter::new();
//! router.register("echo", Arc::new(Echo));
//! router.spawn(Arc::new(EventBus::default()), shutdown).await.unwrap();
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use seat_types::SeatError;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::bus::TopicReceiver;
use crate::transport::PubSubTransport;

/// A handler for every payload received on one topic.
#[async_trait]
pub trait TopicHandler: Send + Sync {
    async fn handle(&self, payload: String) -> Result<(), SeatError>;
}

/// Table of topic → handler, built at startup.
#[derive(Default)]
pub struct TopicRouter {
    routes: HashMap<String, Arc<dyn TopicHandler>>,
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. Returns the handler previously
    /// registered for the same topic, if any.
    pub fn register(
        &mut self,
        topic: impl Into<String>,
        handler: Arc<dyn TopicHandler>,
    ) -> Option<Arc<dyn TopicHandler>> {
        self.routes.insert(topic.into(), handler)
    }

    /// Registered topics, in no particular order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Subscribe to every registered topic and start dispatching.
    ///
    /// Subscriptions are made before this function returns, so anything
    /// published afterwards is seen by the router. The returned task ends
    /// when `shutdown` turns `true` (or its sender is dropped), or when every
    /// topic stream has closed.
    pub fn spawn(
        self,
        transport: Arc<dyn PubSubTransport>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let receivers: Vec<(TopicReceiver, Arc<dyn TopicHandler>)> = self
            .routes
            .into_iter()
            .map(|(topic, handler)| (transport.subscribe(&topic), handler))
            .collect();

        tokio::spawn(async move {
            let mut loops = JoinSet::new();
            for (receiver, handler) in receivers {
                info!(topic = receiver.topic(), "topic handler registered");
                loops.spawn(dispatch_loop(receiver, handler));
            }

            tokio::select! {
                _ = shutdown.wait_for(|stop| *stop) => {
                    info!("router shutting down");
                    loops.abort_all();
                }
                _ = async { while loops.join_next().await.is_some() {} } => {
                    debug!("all topic streams closed");
                }
            }
        })
    }
}

async fn dispatch_loop(mut receiver: TopicReceiver, handler: Arc<dyn TopicHandler>) {
    while let Some(envelope) = receiver.recv().await {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            debug!(topic = %envelope.topic, id = %envelope.id, "dispatching");
            if let Err(e) = handler.handle(envelope.payload).await {
                error!(topic = %envelope.topic, error = %e, "topic handler failed");
            }
        });
    }
}
