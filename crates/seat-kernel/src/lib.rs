//! `seat-kernel` – Safety Interlocks
//!
//! Decides whether the seat may move. It does not talk to the vehicle; it
//! evaluates rules against a [`VehicleState`][interlock::VehicleState]
//! snapshot handed to it by the runtime.
//!
//! # Modules
//!
//! - [`interlock`] – [`Interlock`][interlock::Interlock]: an ordered rule
//!   engine returning the first [`InterlockViolation`][interlock::InterlockViolation],
//!   plus the built-in [`StandstillRule`][interlock::StandstillRule] that only
//!   permits seat motion while the vehicle speed is exactly zero.

pub mod interlock;

pub use interlock::{Interlock, InterlockViolation, Rule, StandstillRule, VehicleState};
