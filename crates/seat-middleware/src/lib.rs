//! `seat-middleware` – pub/sub plumbing for the seat adjuster.
//!
//! Routes JSON payloads between the application components and external
//! clients without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – in-process, topic-keyed publish/subscribe event bus built on
//!   Tokio broadcast channels.
//! - [`transport`] – the [`PubSubTransport`] trait components publish and
//!   subscribe through.
//! - [`router`] – [`TopicRouter`], an explicit topic → handler table with a
//!   dispatch loop.
//! - [`ws_bridge`] – WebSocket bridge that exposes the bus to external
//!   clients as JSON text frames.

pub mod bus;
pub mod router;
pub mod transport;
pub mod ws_bridge;

pub use bus::{EventBus, TopicReceiver};
pub use router::{TopicHandler, TopicRouter};
pub use transport::PubSubTransport;
pub use ws_bridge::WsBridge;
