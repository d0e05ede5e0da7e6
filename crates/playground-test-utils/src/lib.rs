//! Shared test fixtures and utilities for playground crates.
//!
//! Deterministic RNG setup, playground configurations sized for fast tests,
//! and pose comparison helpers.

pub mod config;
pub mod pose;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use config::{open_config, walled_config};
pub use pose::{assert_pose_near, pose_distance};
pub use rng::{deterministic_commands, seeded_rng};
