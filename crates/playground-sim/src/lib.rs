//! Entities, agents and the step/reset engine of the playground simulator.
//!
//! [`Playground`] owns a rapier2d world, the scene [`Element`]s and the
//! [`Agent`]s built from jointed [`Part`]s. Each [`Playground::step`] commits
//! actuator commands, runs the physics sub-steps, dispatches touching shapes
//! to interaction handlers and applies the queued [`Mutation`]s.
//!
//! # Example
//!
//! ```no_run
//! use playground_sim::prelude::*;
//!
//! let registry = Registry::with_defaults().unwrap();
//! let scene = SceneConfig::from_file("scene.toml").unwrap();
//! let mut playground = scene.build(&registry).unwrap();
//! playground.reset().unwrap();
//! let result = playground.step(&Commands::new()).unwrap();
//! println!("rewards: {:?}", result.rewards);
//! ```

pub mod agent;
pub mod elements;
pub mod entity;
pub mod episode;
pub mod ids;
pub mod interaction;
pub mod mutation;
pub mod part;
pub mod playground;
pub mod registry;
pub mod sampler;
pub mod scene;
pub mod sensor;
pub mod spawner;
pub mod stats;
pub mod trajectory;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use agent::{Agent, AgentConfig, GraspHold, PartConfig};
pub use elements::{Element, ElementConfig, ElementKind};
pub use entity::{EntityConfig, EntityCore, EntityFlags, LifeState, Placement};
pub use episode::{Episode, EpisodeState};
pub use ids::{AgentId, ElementId, Owner};
pub use mutation::Mutation;
pub use part::{Mount, Part};
pub use playground::{Commands, Drawable, Playground, StepResult};
pub use registry::Registry;
pub use scene::{SceneConfig, SceneTimer};
pub use stats::EpisodeStats;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Agent, AgentId, Commands, Drawable, Element, ElementId, ElementKind, EntityCore,
        EntityFlags, Episode, EpisodeState, EpisodeStats, Owner, Part, Placement, Playground,
        Registry, SceneConfig, StepResult,
        elements::Activator,
        interaction::Trigger,
        sampler::CoordinateSampler,
        sensor::{PoseSensor, ProximitySensor, Sensor, SpaceView},
        spawner::Spawner,
    };
    pub use playground_actuator::prelude::{
        Actuator, ActuatorKind, CommandMap, Controller, RandomController,
    };
    pub use playground_core::{Contour, Coordinates, PlaygroundConfig, PlaygroundError, Vec2};
}
