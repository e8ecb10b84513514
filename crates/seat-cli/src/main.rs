//! `seat-cli` – Seat Adjuster launcher
//!
//! This binary is the entry point for the seat adjuster application. It:
//!
//! 1. Initialises tracing (optionally exporting spans over OTLP).
//! 2. Loads `~/.seat-adjuster/config.toml` and `SEATADJ_*` overrides.
//! 3. Starts a simulated vehicle, the in-process event bus, and the
//!    WebSocket bridge external clients publish requests through.
//! 4. Runs the [`SeatAdjusterApp`] on a single-threaded Tokio runtime until
//!    **Ctrl-C** or **SIGTERM** is received.

mod config;

use colored::Colorize;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use seat_hal::SimVehicle;
use seat_middleware::{EventBus, WsBridge};
use seat_runtime::SeatAdjusterApp;
use seat_types::SeatError;

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // Must run before the Tokio runtime exists (simple OTLP exporter).
    let _guard = seat_runtime::init_tracing("seat-adjuster");

    print_banner();

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, path = %config::config_path().display(), "config error; using defaults");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };
    info!(?cfg, "configuration");

    // ── Termination handler ───────────────────────────────────────────────
    // `stop` lives until `block_on` returns; a closed channel reads as shutdown.
    let (stop, shutdown) = watch::channel(false);
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("termination signal received");
        let _ = handler_stop.send(true);
    }) {
        warn!(error = %e, "Failed to install termination handler; the app can only be killed");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cfg, shutdown));
    drop(stop);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "seat adjuster terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: config::Config, shutdown: watch::Receiver<bool>) -> Result<(), SeatError> {
    let bus = EventBus::new(cfg.bus_capacity);
    let vehicle = Arc::new(
        SimVehicle::new()
            .with_position(cfg.initial_position)
            .with_speed(cfg.initial_speed),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.ws_port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| SeatError::Transport(format!("ws bind error on {addr}: {e}")))?;
    info!(%addr, "websocket bridge listening");
    let bridge = tokio::spawn(WsBridge::new(bus.clone()).serve(listener));

    let result = SeatAdjusterApp::new(vehicle, Arc::new(bus)).run(shutdown).await;
    bridge.abort();
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "Seat Adjuster".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Vehicle seat position bridge");
    println!();
}
