//! `seat-hal` – Vehicle Signal Access Layer
//!
//! The only way the application touches vehicle signals.
//!
//! # Modules
//!
//! - [`data_point`] – the [`DataPointAccess`] trait: subscribe to, read, and
//!   write a [`DataPoint`][seat_types::DataPoint].
//! - [`sim`] – [`SimVehicle`], an in-process data broker with VSS range
//!   validation and fault injection for running without a vehicle.

pub mod data_point;
pub mod sim;

pub use data_point::{DataPointAccess, DataPointStream};
pub use sim::SimVehicle;
