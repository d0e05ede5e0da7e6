//! Actuators and controllers for playground agents.
//!
//! An [`Actuator`](actuator::Actuator) is a named command channel with a
//! valid-value policy ([`CommandRange`](range::CommandRange)). Every tick the
//! engine resets each command to its default, stores the caller's values
//! through [`set_command`](actuator::Actuator::set_command) under the
//! playground-wide [`CheckMode`](playground_core::CheckMode), then perturbs
//! them with the configured noise as the last step.
//!
//! ```text
//! reset ──► validate (hard: error / soft: clamp) ──► noise ──► physics
//! ```
//!
//! ```
//! use playground_actuator::prelude::*;
//! use playground_core::CheckMode;
//!
//! let mut wheel = Actuator::new("forward", ActuatorKind::forward_force(100.0));
//! wheel.set_command(1.5, CheckMode::Soft).unwrap();
//! assert_eq!(wheel.command(), 1.0);
//! assert!(wheel.set_command(1.5, CheckMode::Hard).is_err());
//! ```

pub mod actuator;
pub mod config;
pub mod controller;
pub mod range;

pub mod prelude {
    pub use crate::actuator::{Actuator, ActuatorKind, ForceAxis};
    pub use crate::config::{ActuatorConfig, RangeConfig};
    pub use crate::controller::{CommandMap, ConstantController, Controller, RandomController};
    pub use crate::range::CommandRange;
}
