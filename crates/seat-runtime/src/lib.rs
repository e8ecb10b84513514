//! `seat-runtime` – The Seat Adjuster Application
//!
//! Wires the vehicle-signal layer to the pub/sub transport.
//!
//! # Modules
//!
//! - [`forwarder`] – [`SignalForwarder`][forwarder::SignalForwarder]:
//!   republishes every seat position change on
//!   `seatadjuster/currentPosition`.
//! - [`responder`] – [`CommandResponder`][responder::CommandResponder]:
//!   answers `seatadjuster/setPosition/request` messages, gating the write on
//!   the standstill [`Interlock`][seat_kernel::Interlock] and publishing a
//!   correlated response on `seatadjuster/setPosition/response`.
//! - [`app`] – [`SeatAdjusterApp`][app::SeatAdjusterApp]: subscribes on
//!   start, registers the request handler with a
//!   [`TopicRouter`][seat_middleware::TopicRouter], and runs until shutdown.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to any OTLP-compatible collector.

pub mod app;
pub mod forwarder;
pub mod responder;
pub mod telemetry;

pub use app::{AppHandle, SeatAdjusterApp};
pub use forwarder::SignalForwarder;
pub use responder::CommandResponder;
pub use telemetry::{init_tracing, TracerProviderGuard};
