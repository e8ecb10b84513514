use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Topic on which every observed seat position change is published.
pub const CURRENT_POSITION_TOPIC: &str = "seatadjuster/currentPosition";
/// Topic carrying inbound set-position requests.
pub const SET_POSITION_REQUEST_TOPIC: &str = "seatadjuster/setPosition/request";
/// Topic carrying the correlated set-position responses.
pub const SET_POSITION_RESPONSE_TOPIC: &str = "seatadjuster/setPosition/response";

/// Vehicle signals this application reads or writes through the data broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataPoint {
    /// Position of the driver seat (row 1, position 1).
    SeatPosition,
    /// Current vehicle speed. Read-only.
    Speed,
}

impl DataPoint {
    /// The VSS path of the data point, e.g. `"Vehicle.Speed"`.
    pub fn path(&self) -> &'static str {
        match self {
            DataPoint::SeatPosition => "Vehicle.Cabin.Seat.Row1.Pos1.Position",
            DataPoint::Speed => "Vehicle.Speed",
        }
    }
}

impl std::fmt::Display for DataPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A typed value carried by a [`DataPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Int32(i32),
    Float(f32),
}

impl DataValue {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            DataValue::Int32(v) => Some(*v),
            DataValue::Float(_) => None,
        }
    }

    /// Numeric view of the value. Integers are widened.
    pub fn as_f32(&self) -> f32 {
        match self {
            DataValue::Int32(v) => *v as f32,
            DataValue::Float(v) => *v,
        }
    }
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Int32(v) => write!(f, "{v}"),
            DataValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Payload published on [`CURRENT_POSITION_TOPIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChangeEvent {
    pub position: i32,
}

/// Payload received on [`SET_POSITION_REQUEST_TOPIC`].
///
/// `request_id` is an opaque correlation token; it is neither validated nor
/// deduplicated. `position` accepts any JSON integer; whether it fits the
/// seat position data point is decided by the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPositionRequest {
    pub request_id: String,
    pub position: i64,
}

/// Outcome code of a set-position request. Serialized as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    Ok,
    Failed,
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => 0,
            Status::Failed => 1,
        }
    }
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::Ok),
            1 => Ok(Status::Failed),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

/// The `result` object of a [`SetPositionResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: Status,
    pub message: String,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: message.into(),
        }
    }
}

/// Payload published on [`SET_POSITION_RESPONSE_TOPIC`].
///
/// `request_id` is `None` (serialized as `null`) only when the inbound
/// message was too malformed to recover a correlation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPositionResponse {
    pub request_id: Option<String>,
    pub result: CommandResult,
}

/// Unit of transport on the pub/sub bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"seatadjuster/currentPosition"`
    pub topic: String,
    /// UTF-8 JSON text.
    pub payload: String,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Failure raised by a write (or read) against the vehicle-signal layer.
///
/// The two kinds are reported identically to clients; the distinction is
/// kept for callers that want differentiated logging.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataPointError {
    /// The value was rejected by the data point's constraints (range, type).
    #[error("{0}")]
    Validation(String),

    /// Any other broker-side failure.
    #[error("{0}")]
    Other(String),
}

impl DataPointError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DataPointError::Validation(_))
    }
}

/// Global error type spanning transport, parsing, and data-broker failures.
#[derive(Error, Debug)]
pub enum SeatError {
    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Invalid request: {0}")]
    Parse(String),

    #[error("Data point error: {0}")]
    DataPoint(#[from] DataPointError),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Config Error: {0}")]
    Config(String),
}
