//! Launcher configuration – reads `~/.seat-adjuster/config.toml`.

use seat_types::SeatError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Launcher settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Port of the WebSocket bridge external clients connect to.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Per-topic buffer of the in-process event bus.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Seat position the simulated vehicle starts with.
    #[serde(default)]
    pub initial_position: i32,

    /// Speed the simulated vehicle starts with. Anything but 0 blocks seat
    /// motion.
    #[serde(default)]
    pub initial_speed: f32,
}

fn default_ws_port() -> u16 {
    9090
}
fn default_bus_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_port: default_ws_port(),
            bus_capacity: default_bus_capacity(),
            initial_position: 0,
            initial_speed: 0.0,
        }
    }
}

/// Return the path to `~/.seat-adjuster/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".seat-adjuster").join("config.toml")
}

/// Load the config from disk and apply `SEATADJ_*` overrides. A missing file
/// yields the defaults.
pub fn load() -> Result<Config, SeatError> {
    let mut cfg = load_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path. Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, SeatError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| SeatError::Config(format!("failed to read {}: {e}", path.display())))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| SeatError::Config(format!("failed to parse {}: {e}", path.display())))?;
    if cfg.bus_capacity == 0 {
        return Err(SeatError::Config("bus_capacity must be greater than 0".into()));
    }
    Ok(Some(cfg))
}

/// Apply `SEATADJ_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `SEATADJ_WS_PORT` | `ws_port` |
/// | `SEATADJ_BUS_CAPACITY` | `bus_capacity` |
/// | `SEATADJ_INITIAL_POSITION` | `initial_position` |
/// | `SEATADJ_INITIAL_SPEED` | `initial_speed` |
///
/// Values that do not parse (or a zero bus capacity) are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("SEATADJ_WS_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.ws_port = port;
    }
    if let Ok(v) = std::env::var("SEATADJ_BUS_CAPACITY")
        && let Ok(capacity) = v.parse::<usize>()
        && capacity > 0
    {
        cfg.bus_capacity = capacity;
    }
    if let Ok(v) = std::env::var("SEATADJ_INITIAL_POSITION")
        && let Ok(position) = v.parse::<i32>()
    {
        cfg.initial_position = position;
    }
    if let Ok(v) = std::env::var("SEATADJ_INITIAL_SPEED")
        && let Ok(speed) = v.parse::<f32>()
    {
        cfg.initial_speed = speed;
    }
}
