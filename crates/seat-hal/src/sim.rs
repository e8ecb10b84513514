//! In-process simulated vehicle for CI/CD testing without a data broker.
//!
//! [`SimVehicle`] holds the seat position and vehicle speed in memory,
//! validates writes the way the broker validates VSS signals, and notifies
//! subscribers of every accepted change. This lets the full application run
//! in headless tests and on a developer machine.
//!
//! # Example
//!
//! ```rust
//! use seat_hal::{DataPointAccess, SimVehicle};
//! use seat_types::{DataPoint, DataValue};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let vehicle = SimVehicle::new().with_position(100);
//! vehicle
//!     .set(DataPoint::SeatPosition, DataValue::Int32(250))
//!     .await
//!     .expect("sim write must succeed");
//! assert_eq!(vehicle.position(), 250);
//! # });
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use seat_types::{DataPoint, DataPointError, DataValue};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::data_point::{DataPointAccess, DataPointStream};

/// Lowest accepted seat position (VSS `Vehicle.Cabin.Seat.*.Position` min).
pub const SEAT_POSITION_MIN: i32 = 0;
/// Highest accepted seat position (VSS `Vehicle.Cabin.Seat.*.Position` max).
pub const SEAT_POSITION_MAX: i32 = 1000;

const NOTIFY_CAPACITY: usize = 64;

struct SimState {
    position: i32,
    speed: f32,
    pending_fault: Option<DataPointError>,
}

/// A simulated vehicle exposing [`DataPoint::SeatPosition`] (read/write) and
/// [`DataPoint::Speed`] (read-only through [`DataPointAccess`], driven with
/// [`SimVehicle::set_speed`]).
pub struct SimVehicle {
    state: Mutex<SimState>,
    position_tx: broadcast::Sender<DataValue>,
    speed_tx: broadcast::Sender<DataValue>,
}

impl SimVehicle {
    /// A parked vehicle (speed 0) with the seat at position 0.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                position: SEAT_POSITION_MIN,
                speed: 0.0,
                pending_fault: None,
            }),
            position_tx: broadcast::channel(NOTIFY_CAPACITY).0,
            speed_tx: broadcast::channel(NOTIFY_CAPACITY).0,
        }
    }

    /// Builder: initial seat position. Not range-checked.
    pub fn with_position(self, position: i32) -> Self {
        self.lock().position = position;
        self
    }

    /// Builder: initial vehicle speed.
    pub fn with_speed(self, speed: f32) -> Self {
        self.lock().speed = speed;
        self
    }

    /// Drive the simulated vehicle speed and notify speed subscribers.
    pub fn set_speed(&self, speed: f32) {
        let mut state = self.lock();
        if state.speed != speed {
            state.speed = speed;
            let _ = self.speed_tx.send(DataValue::Float(speed));
        }
    }

    /// Make the next write (to any data point) fail with `error`.
    pub fn inject_write_fault(&self, error: DataPointError) {
        self.lock().pending_fault = Some(error);
    }

    pub fn position(&self) -> i32 {
        self.lock().position
    }

    pub fn speed(&self) -> f32 {
        self.lock().speed
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sender(&self, point: DataPoint) -> &broadcast::Sender<DataValue> {
        match point {
            DataPoint::SeatPosition => &self.position_tx,
            DataPoint::Speed => &self.speed_tx,
        }
    }
}

impl Default for SimVehicle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataPointAccess for SimVehicle {
    async fn get(&self, point: DataPoint) -> Result<DataValue, DataPointError> {
        let state = self.lock();
        Ok(match point {
            DataPoint::SeatPosition => DataValue::Int32(state.position),
            DataPoint::Speed => DataValue::Float(state.speed),
        })
    }

    async fn set(&self, point: DataPoint, value: DataValue) -> Result<(), DataPointError> {
        let mut state = self.lock();
        if let Some(fault) = state.pending_fault.take() {
            warn!(%point, error = %fault, "injected write fault");
            return Err(fault);
        }

        match point {
            DataPoint::Speed => Err(DataPointError::Other(format!("{point} is read-only"))),
            DataPoint::SeatPosition => {
                let Some(position) = value.as_i32() else {
                    return Err(DataPointError::Validation(format!(
                        "{point} expects an integer, got {value}"
                    )));
                };
                if !(SEAT_POSITION_MIN..=SEAT_POSITION_MAX).contains(&position) {
                    return Err(DataPointError::Validation(format!(
                        "{position} is out of range [{SEAT_POSITION_MIN}, {SEAT_POSITION_MAX}] for {point}"
                    )));
                }
                debug!(%point, from = state.position, to = position, "seat position written");
                if state.position != position {
                    state.position = position;
                    let _ = self.position_tx.send(DataValue::Int32(position));
                }
                Ok(())
            }
        }
    }

    /// The stream yields the current value first, then every change.
    async fn subscribe(&self, point: DataPoint) -> Result<DataPointStream, DataPointError> {
        // Hold the lock so no change slips between the snapshot and the
        // receiver registration.
        let state = self.lock();
        let current = match point {
            DataPoint::SeatPosition => DataValue::Int32(state.position),
            DataPoint::Speed => DataValue::Float(state.speed),
        };
        let rx = self.sender(point).subscribe();
        drop(state);

        let changes = stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(value) => return Some((value, rx)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(%point, lagged_by = n, "data point subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(stream::once(async move { current }).chain(changes).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn get_reports_initial_state() {
        let vehicle = SimVehicle::new().with_position(300).with_speed(12.5);
        assert_eq!(
            vehicle.get(DataPoint::SeatPosition).await.unwrap(),
            DataValue::Int32(300)
        );
        assert_eq!(
            vehicle.get(DataPoint::Speed).await.unwrap(),
            DataValue::Float(12.5)
        );
    }

    #[tokio::test]
    async fn valid_write_updates_position() {
        let vehicle = SimVehicle::new();
        vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(SEAT_POSITION_MAX))
            .await
            .unwrap();
        assert_eq!(vehicle.position(), SEAT_POSITION_MAX);
    }

    #[tokio::test]
    async fn out_of_range_write_is_a_validation_error_and_leaves_value() {
        let vehicle = SimVehicle::new().with_position(10);
        let err = vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(1001))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("1001"));
        assert_eq!(vehicle.position(), 10);

        let err = vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(-1))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(vehicle.position(), 10);
    }

    #[tokio::test]
    async fn float_write_to_position_is_a_validation_error() {
        let vehicle = SimVehicle::new();
        let err = vehicle
            .set(DataPoint::SeatPosition, DataValue::Float(1.5))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn speed_is_read_only() {
        let vehicle = SimVehicle::new();
        let err = vehicle
            .set(DataPoint::Speed, DataValue::Float(3.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DataPointError::Other(_)));
    }

    #[tokio::test]
    async fn injected_fault_fails_exactly_one_write() {
        let vehicle = SimVehicle::new();
        vehicle.inject_write_fault(DataPointError::Other("broker unavailable".into()));

        let err = vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(5))
            .await
            .unwrap_err();
        assert_eq!(err, DataPointError::Other("broker unavailable".into()));
        assert_eq!(vehicle.position(), 0);

        vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(5))
            .await
            .unwrap();
        assert_eq!(vehicle.position(), 5);
    }

    #[tokio::test]
    async fn subscribe_yields_current_value_then_changes() {
        let vehicle = SimVehicle::new().with_position(7);
        let mut stream = vehicle.subscribe(DataPoint::SeatPosition).await.unwrap();

        assert_eq!(stream.next().await, Some(DataValue::Int32(7)));

        vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(8))
            .await
            .unwrap();
        assert_eq!(stream.next().await, Some(DataValue::Int32(8)));
    }

    #[tokio::test]
    async fn rewriting_same_value_does_not_notify() {
        let vehicle = SimVehicle::new().with_position(7);
        let mut stream = vehicle.subscribe(DataPoint::SeatPosition).await.unwrap();
        assert_eq!(stream.next().await, Some(DataValue::Int32(7)));

        vehicle
            .set(DataPoint::SeatPosition, DataValue::Int32(7))
            .await
            .unwrap();
        let next = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(next.is_err(), "unchanged value must not be re-notified");
    }

    #[tokio::test]
    async fn set_speed_notifies_speed_subscribers() {
        let vehicle = SimVehicle::new();
        let mut stream = vehicle.subscribe(DataPoint::Speed).await.unwrap();
        assert_eq!(stream.next().await, Some(DataValue::Float(0.0)));

        vehicle.set_speed(30.0);
        assert_eq!(stream.next().await, Some(DataValue::Float(30.0)));
        assert_eq!(vehicle.speed(), 30.0);
    }
}
