//! [`Interlock`] – seat-motion safety interlock / rule engine.
//!
//! Before the seat position is written, take a [`VehicleState`] snapshot and
//! pass it through [`Interlock::verify`]. Every registered [`Rule`] is
//! evaluated in order; the first violation is returned and the write must
//! **not** be attempted.
//!
//! One built-in rule is provided:
//! - [`StandstillRule`] – permits motion only while the vehicle speed is
//!   exactly zero.
//!
//! # Example
//!
//! ```
//! use seat_kernel::{Interlock, VehicleState};
//!
//! let interlock = Interlock::seat_motion();
//! assert!(interlock.verify(&VehicleState { speed: 0.0 }).is_ok());
//!
//! let err = interlock.verify(&VehicleState { speed: 5.0 }).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Not allowed to move seat because vehicle speed is 5 and not 0"
//! );
//! ```

use thiserror::Error;
use tracing::debug;

/// Vehicle signals the interlock rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub speed: f32,
}

/// A rule rejected the requested motion. `Display` is the user-facing
/// explanation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InterlockViolation {
    /// [`Rule::name`] of the rule that fired.
    pub rule: String,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Rule trait
// ────────────────────────────────────────────────────────────────────────────

/// A single condition that must hold before the seat may move.
///
/// Implement this trait to create custom interlock rules and add them to an
/// [`Interlock`] via [`Interlock::add_rule`].
pub trait Rule: Send + Sync {
    /// Human-readable name used in violations and logs.
    fn name(&self) -> &str;

    /// Return `Ok(())` when `state` permits motion.
    fn check(&self, state: &VehicleState) -> Result<(), InterlockViolation>;
}

// ────────────────────────────────────────────────────────────────────────────
// Interlock
// ────────────────────────────────────────────────────────────────────────────

/// Ordered rule engine guarding seat motion.
#[derive(Default)]
pub struct Interlock {
    rules: Vec<Box<dyn Rule>>,
}

impl Interlock {
    /// Create an empty interlock with no rules. It permits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The interlock used for seat adjustment: [`StandstillRule`] only.
    pub fn seat_motion() -> Self {
        let mut interlock = Self::new();
        interlock.add_rule(Box::new(StandstillRule));
        interlock
    }

    /// Register a new [`Rule`]. Rules are evaluated in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Check `state` against every registered rule.
    ///
    /// Returns the first [`InterlockViolation`] encountered, or `Ok(())`
    /// when all rules pass.
    pub fn verify(&self, state: &VehicleState) -> Result<(), InterlockViolation> {
        for rule in &self.rules {
            if let Err(violation) = rule.check(state) {
                debug!(rule = rule.name(), speed = state.speed, "interlock engaged");
                return Err(violation);
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rules
// ────────────────────────────────────────────────────────────────────────────

/// Permits seat motion only when the vehicle speed equals zero exactly.
/// Any other value, including `NaN`, engages the interlock.
pub struct StandstillRule;

impl Rule for StandstillRule {
    fn name(&self) -> &str {
        "standstill"
    }

    fn check(&self, state: &VehicleState) -> Result<(), InterlockViolation> {
        if state.speed == 0.0 {
            return Ok(());
        }
        Err(InterlockViolation {
            rule: self.name().to_string(),
            message: format!(
                "Not allowed to move seat because vehicle speed is {} and not 0",
                state.speed
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(speed: f32) -> VehicleState {
        VehicleState { speed }
    }

    /// Fails whenever speed is negative; used to check rule ordering.
    struct NoReverse;

    impl Rule for NoReverse {
        fn name(&self) -> &str {
            "no_reverse"
        }

        fn check(&self, state: &VehicleState) -> Result<(), InterlockViolation> {
            if state.speed < 0.0 {
                return Err(InterlockViolation {
                    rule: self.name().to_string(),
                    message: "reversing".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn standstill_passes() {
        assert!(Interlock::seat_motion().verify(&at(0.0)).is_ok());
    }

    #[test]
    fn negative_zero_counts_as_standstill() {
        assert!(Interlock::seat_motion().verify(&at(-0.0)).is_ok());
    }

    #[test]
    fn moving_vehicle_is_rejected_with_speed_in_message() {
        let err = Interlock::seat_motion().verify(&at(5.0)).unwrap_err();
        assert_eq!(err.rule, "standstill");
        assert_eq!(
            err.to_string(),
            "Not allowed to move seat because vehicle speed is 5 and not 0"
        );
    }

    #[test]
    fn threshold_is_exact_equality() {
        let err = Interlock::seat_motion().verify(&at(0.01)).unwrap_err();
        assert!(err.message.contains("0.01"));
    }

    #[test]
    fn nan_speed_is_rejected() {
        assert!(Interlock::seat_motion().verify(&at(f32::NAN)).is_err());
    }

    #[test]
    fn empty_interlock_always_passes() {
        assert!(Interlock::new().verify(&at(120.0)).is_ok());
    }

    #[test]
    fn first_failing_rule_short_circuits() {
        let mut interlock = Interlock::new();
        interlock.add_rule(Box::new(NoReverse));
        interlock.add_rule(Box::new(StandstillRule));

        let err = interlock.verify(&at(-3.0)).unwrap_err();
        assert_eq!(err.rule, "no_reverse");

        let err = interlock.verify(&at(3.0)).unwrap_err();
        assert_eq!(err.rule, "standstill");
    }
}
