//! [`CommandResponder`] – the set-position request/response handler.
//!
//! Every message on `seatadjuster/setPosition/request` goes through one
//! linear sequence:
//!
//! 1. **Parse** the JSON into a [`SetPositionRequest`].
//! 2. **Read** `Vehicle.Speed` from the data broker.
//! 3. **Gatekeep** – the speed is checked by the standstill [`Interlock`].
//!    A moving vehicle short-circuits to a rejection; the write is never
//!    attempted.
//! 4. **Write** the requested position. Validation and other broker errors
//!    are both reported as `status: 1` with the error text interpolated.
//! 5. **Respond** on `seatadjuster/setPosition/response` with the request's
//!    `requestId`.
//!
//! Nothing after a successful parse escapes as an error except a failure to
//! publish the response itself. A message that does not parse still gets a
//! best-effort `status: 1` response, correlated with the raw `requestId` when
//! one can be found and `null` otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use seat_hal::DataPointAccess;
use seat_kernel::{Interlock, VehicleState};
use seat_middleware::{PubSubTransport, TopicHandler};
use seat_types::{
    CommandResult, DataPoint, DataPointError, DataValue, SET_POSITION_RESPONSE_TOPIC, SeatError,
    SetPositionRequest, SetPositionResponse,
};
use tracing::{error, info, instrument, warn};

pub struct CommandResponder {
    vehicle: Arc<dyn DataPointAccess>,
    transport: Arc<dyn PubSubTransport>,
    interlock: Interlock,
}

impl CommandResponder {
    /// A responder guarded by [`Interlock::seat_motion`].
    pub fn new(vehicle: Arc<dyn DataPointAccess>, transport: Arc<dyn PubSubTransport>) -> Self {
        Self {
            vehicle,
            transport,
            interlock: Interlock::seat_motion(),
        }
    }

    /// Replace the interlock (builder-style).
    pub fn with_interlock(mut self, interlock: Interlock) -> Self {
        self.interlock = interlock;
        self
    }

    /// Handle one raw request and publish exactly one response.
    ///
    /// Returns the published response.
    ///
    /// # Errors
    ///
    /// Only serialization or publish failures of the response itself.
    #[instrument(skip_all)]
    pub async fn on_set_position_request(&self, raw: &str) -> Result<SetPositionResponse, SeatError> {
        let response = match serde_json::from_str::<SetPositionRequest>(raw) {
            Ok(request) => SetPositionResponse {
                result: self.execute(&request).await,
                request_id: Some(request.request_id),
            },
            Err(e) => {
                let err = SeatError::Parse(e.to_string());
                warn!(error = %err, "malformed set-position request");
                SetPositionResponse {
                    request_id: raw_request_id(raw),
                    result: CommandResult::failed(err.to_string()),
                }
            }
        };

        let payload = serde_json::to_string(&response)
            .map_err(|e| SeatError::Serialization(e.to_string()))?;
        self.transport
            .publish(SET_POSITION_RESPONSE_TOPIC, payload)
            .await?;
        Ok(response)
    }

    async fn execute(&self, request: &SetPositionRequest) -> CommandResult {
        let request_id = request.request_id.as_str();
        let position = request.position;

        let speed = match self.vehicle.get(DataPoint::Speed).await {
            Ok(value) => value.as_f32(),
            Err(e) => {
                error!(request_id, error = %e, "failed to read vehicle speed");
                return CommandResult::failed(format!(
                    "Failed to read vehicle speed, error: {e}"
                ));
            }
        };

        if let Err(violation) = self.interlock.verify(&VehicleState { speed }) {
            info!(request_id, speed, rule = %violation.rule, "seat motion refused");
            return CommandResult::failed(violation.to_string());
        }

        let written = match i32::try_from(position) {
            Ok(value) => {
                self.vehicle
                    .set(DataPoint::SeatPosition, DataValue::Int32(value))
                    .await
            }
            Err(_) => Err(DataPointError::Validation(format!(
                "{position} does not fit the Int32 data point {}",
                DataPoint::SeatPosition
            ))),
        };

        match written {
            Ok(()) => {
                info!(request_id, position, "seat position set");
                CommandResult::ok(format!("Set position to {position}"))
            }
            Err(e) => {
                if e.is_validation() {
                    warn!(request_id, position, error = %e, "seat position rejected");
                } else {
                    error!(request_id, position, error = %e, "seat position write failed");
                }
                CommandResult::failed(format!(
                    "Failed to set position to {position}, error: {e}"
                ))
            }
        }
    }
}

#[async_trait]
impl TopicHandler for CommandResponder {
    async fn handle(&self, payload: String) -> Result<(), SeatError> {
        self.on_set_position_request(&payload).await.map(|_| ())
    }
}

/// `requestId` of a message that failed strict parsing, if it is still a
/// JSON object with a string `requestId`.
fn raw_request_id(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.get("requestId")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use seat_hal::{DataPointStream, SimVehicle};
    use seat_middleware::EventBus;
    use seat_types::Status;
    use std::sync::Mutex;

    /// Broker double: fixed speed, records writes, optional write error.
    struct ScriptedVehicle {
        speed: Result<f32, DataPointError>,
        write_error: Option<DataPointError>,
        writes: Mutex<Vec<i32>>,
    }

    impl ScriptedVehicle {
        fn at_speed(speed: f32) -> Self {
            Self {
                speed: Ok(speed),
                write_error: None,
                writes: Mutex::new(Vec::new()),
            }
        }

        fn writes(&self) -> Vec<i32> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DataPointAccess for ScriptedVehicle {
        async fn get(&self, point: DataPoint) -> Result<DataValue, DataPointError> {
            assert_eq!(point, DataPoint::Speed);
            self.speed.clone().map(DataValue::Float)
        }

        async fn set(&self, _point: DataPoint, value: DataValue) -> Result<(), DataPointError> {
            self.writes.lock().unwrap().push(value.as_i32().unwrap());
            match &self.write_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn subscribe(&self, _point: DataPoint) -> Result<DataPointStream, DataPointError> {
            Ok(Box::pin(stream::empty()))
        }
    }

    fn responder(vehicle: Arc<dyn DataPointAccess>) -> (EventBus, CommandResponder) {
        let bus = EventBus::default();
        let responder = CommandResponder::new(vehicle, Arc::new(bus.clone()));
        (bus, responder)
    }

    #[tokio::test]
    async fn standstill_and_successful_write_reports_success() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(0.0));
        let (bus, responder) = responder(vehicle.clone());
        let mut rx = bus.subscribe(SET_POSITION_RESPONSE_TOPIC);

        let response = responder
            .on_set_position_request(r#"{"requestId":"abc","position":42}"#)
            .await
            .unwrap();

        assert_eq!(response.request_id.as_deref(), Some("abc"));
        assert_eq!(response.result.status, Status::Ok);
        assert_eq!(vehicle.writes(), vec![42]);
        assert_eq!(
            rx.recv().await.unwrap().payload,
            r#"{"requestId":"abc","result":{"status":0,"message":"Set position to 42"}}"#
        );
    }

    #[tokio::test]
    async fn moving_vehicle_is_refused_without_writing() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(5.0));
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"r2","position":20}"#)
            .await
            .unwrap();

        assert!(vehicle.writes().is_empty(), "write must not be attempted");
        assert_eq!(response.request_id.as_deref(), Some("r2"));
        assert_eq!(response.result.status, Status::Failed);
        assert_eq!(
            response.result.message,
            "Not allowed to move seat because vehicle speed is 5 and not 0"
        );
    }

    #[tokio::test]
    async fn validation_error_is_reported_and_position_unchanged() {
        let vehicle = Arc::new(SimVehicle::new().with_position(100));
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"v","position":1500}"#)
            .await
            .unwrap();

        assert_eq!(response.result.status, Status::Failed);
        assert!(
            response
                .result
                .message
                .starts_with("Failed to set position to 1500, error: ")
        );
        assert!(response.result.message.contains("out of range"));
        assert_eq!(vehicle.position(), 100);
    }

    #[tokio::test]
    async fn other_write_error_is_reported_like_validation() {
        let mut scripted = ScriptedVehicle::at_speed(0.0);
        scripted.write_error = Some(DataPointError::Other("databroker unavailable".into()));
        let (_bus, responder) = responder(Arc::new(scripted));

        let response = responder
            .on_set_position_request(r#"{"requestId":"o","position":7}"#)
            .await
            .unwrap();

        assert_eq!(response.result.status, Status::Failed);
        assert_eq!(
            response.result.message,
            "Failed to set position to 7, error: databroker unavailable"
        );
    }

    #[tokio::test]
    async fn speed_read_failure_is_reported() {
        let mut scripted = ScriptedVehicle::at_speed(0.0);
        scripted.speed = Err(DataPointError::Other("no speed signal".into()));
        let vehicle = Arc::new(scripted);
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"s","position":7}"#)
            .await
            .unwrap();

        assert!(vehicle.writes().is_empty());
        assert_eq!(
            response.result.message,
            "Failed to read vehicle speed, error: no speed signal"
        );
    }

    #[tokio::test]
    async fn malformed_json_gets_uncorrelated_error_response() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(0.0));
        let (bus, responder) = responder(vehicle.clone());
        let mut rx = bus.subscribe(SET_POSITION_RESPONSE_TOPIC);

        let response = responder.on_set_position_request("{not json").await.unwrap();

        assert_eq!(response.request_id, None);
        assert_eq!(response.result.status, Status::Failed);
        assert!(response.result.message.starts_with("Invalid request: "));
        assert!(vehicle.writes().is_empty());
        assert!(
            rx.recv()
                .await
                .unwrap()
                .payload
                .starts_with(r#"{"requestId":null,"#)
        );
    }

    #[tokio::test]
    async fn missing_position_keeps_the_request_id() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(0.0));
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"p","position":"high"}"#)
            .await
            .unwrap();

        assert_eq!(response.request_id.as_deref(), Some("p"));
        assert_eq!(response.result.status, Status::Failed);
        assert!(vehicle.writes().is_empty());
    }

    #[tokio::test]
    async fn missing_request_id_is_null() {
        let (_bus, responder) = responder(Arc::new(ScriptedVehicle::at_speed(0.0)));

        let response = responder
            .on_set_position_request(r#"{"position":1}"#)
            .await
            .unwrap();

        assert_eq!(response.request_id, None);
        assert!(response.result.message.contains("requestId"));
    }

    #[tokio::test]
    async fn position_beyond_i32_is_reported_as_write_failure() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(0.0));
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"big","position":3000000000}"#)
            .await
            .unwrap();

        assert_eq!(response.request_id.as_deref(), Some("big"));
        assert_eq!(response.result.status, Status::Failed);
        assert!(
            response
                .result
                .message
                .starts_with("Failed to set position to 3000000000, error: ")
        );
        assert!(vehicle.writes().is_empty());
    }

    #[tokio::test]
    async fn position_beyond_i32_on_moving_vehicle_is_refused_first() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(2.0));
        let (_bus, responder) = responder(vehicle.clone());

        let response = responder
            .on_set_position_request(r#"{"requestId":"big","position":-3000000000}"#)
            .await
            .unwrap();

        assert!(response.result.message.starts_with("Not allowed to move seat"));
    }

    #[tokio::test]
    async fn empty_interlock_permits_moving_vehicle() {
        let vehicle = Arc::new(ScriptedVehicle::at_speed(30.0));
        let bus = EventBus::default();
        let responder = CommandResponder::new(vehicle.clone(), Arc::new(bus))
            .with_interlock(Interlock::new());

        let response = responder
            .on_set_position_request(r#"{"requestId":"i","position":5}"#)
            .await
            .unwrap();

        assert_eq!(response.result.status, Status::Ok);
        assert_eq!(vehicle.writes(), vec![5]);
    }

    #[test]
    fn raw_request_id_extraction() {
        assert_eq!(raw_request_id(r#"{"requestId":"x"}"#).as_deref(), Some("x"));
        assert_eq!(raw_request_id(r#"{"requestId":5}"#), None);
        assert_eq!(raw_request_id("[]"), None);
        assert_eq!(raw_request_id("garbage"), None);
    }
}
