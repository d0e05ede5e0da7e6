// playground-core: Errors, config, seeds, timers and geometry for the playground simulator.

pub mod config;
pub mod error;
pub mod geometry;
pub mod seed;
pub mod time;
pub mod types;

pub use config::{CheckMode, PlaygroundConfig};
pub use error::{
    CommandValidationError, ConfigError, InvariantError, PlacementError, PlaygroundError,
};
pub use geometry::{Contour, ContourConfig, Mask, ShapeKind};
pub use seed::SeedHierarchy;
pub use time::{CountDownTimer, PeriodicTimer, Timer, TimerConfig};
pub use types::{Coordinates, CoordinatesConfig, Teams, Vec2};
