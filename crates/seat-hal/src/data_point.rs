//! Generic `DataPointAccess` trait for reading, writing and observing
//! vehicle signals.
//!
//! Brokers implement this trait; the rest of the application only ever talks
//! to the trait, so the simulated broker can be swapped for a real one without
//! touching the forwarding or command logic.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use seat_types::{DataPoint, DataPointError, DataValue};

/// Live stream of value changes for one data point.
pub type DataPointStream = BoxStream<'static, DataValue>;

/// Access to the vehicle-signal layer.
///
/// # Contract
///
/// * `get` – current value of the data point. May suspend until the broker
///   answers.
/// * `set` – request a new target value. Fails with
///   [`DataPointError::Validation`] when the value violates the data point's
///   constraints and [`DataPointError::Other`] for anything else. A failed
///   write leaves the value unchanged.
/// * `subscribe` – stream of subsequent value changes. Duplicate or
///   out-of-order delivery is up to the broker.
#[async_trait]
pub trait DataPointAccess: Send + Sync {
    async fn get(&self, point: DataPoint) -> Result<DataValue, DataPointError>;

    async fn set(&self, point: DataPoint, value: DataValue) -> Result<(), DataPointError>;

    async fn subscribe(&self, point: DataPoint) -> Result<DataPointStream, DataPointError>;
}
