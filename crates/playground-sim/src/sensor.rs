//! Read-only sensor interface over the playground state.
//!
//! Sensors run after a tick is final. They see entity poses and agent
//! state through [`SpaceView`] and never mutate the playground.

use playground_core::{ConfigError, Coordinates, Vec2};
use playground_physics::PhysicsContext;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::agent::Agent;
use crate::elements::Element;
use crate::ids::{AgentId, ElementId, Owner};

/// Something a sensor can see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seen {
    pub owner: Owner,
    pub coordinates: Coordinates,
    pub distance: f32,
}

/// Borrowed view of the playground for sensors.
#[derive(Clone, Copy)]
pub struct SpaceView<'a> {
    pub(crate) physics: &'a PhysicsContext,
    pub(crate) elements: &'a SlotMap<ElementId, Element>,
    pub(crate) agents: &'a SlotMap<AgentId, Agent>,
    pub(crate) tick: u64,
}

impl<'a> SpaceView<'a> {
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Pose of the agent's base.
    #[must_use]
    pub fn agent_pose(&self, agent: AgentId) -> Option<Coordinates> {
        let body = self.agents.get(agent)?.base().core.body()?;
        self.physics.pose(body)
    }

    #[must_use]
    pub fn agent_velocity(&self, agent: AgentId) -> Option<(Vec2, f32)> {
        let body = self.agents.get(agent)?.base().core.body()?;
        self.physics.velocity(body)
    }

    #[must_use]
    pub fn agent(&self, agent: AgentId) -> Option<&'a Agent> {
        self.agents.get(agent)
    }

    #[must_use]
    pub fn element_pose(&self, element: ElementId) -> Option<Coordinates> {
        let body = self.elements.get(element)?.core.body()?;
        self.physics.pose(body)
    }

    #[must_use]
    pub fn element(&self, element: ElementId) -> Option<&'a Element> {
        self.elements.get(element)
    }

    /// Visible, non-transparent entities within `radius` of `center`,
    /// nearest first.
    #[must_use]
    pub fn within(&self, center: Vec2, radius: f32) -> Vec<Seen> {
        let elements = self.elements.iter().filter_map(|(id, e)| {
            (e.core.visible() && !e.core.flags.transparent)
                .then(|| e.core.body().map(|b| (Owner::Element(id), b)))
                .flatten()
        });
        let parts = self.agents.iter().flat_map(|(id, a)| {
            a.parts()
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.core.flags.transparent)
                .filter_map(move |(i, p)| p.core.body().map(|b| (Owner::Part(id, i), b)))
        });
        let mut seen: Vec<Seen> = elements
            .chain(parts)
            .filter_map(|(owner, body)| {
                let coordinates = self.physics.pose(body)?;
                let distance = (coordinates.position - center).norm();
                (distance <= radius).then_some(Seen {
                    owner,
                    coordinates,
                    distance,
                })
            })
            .collect();
        seen.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.owner.cmp(&b.owner)));
        seen
    }
}

/// Produces one reading per tick for one agent.
pub trait Sensor: Send {
    fn name(&self) -> &str;

    fn update(&mut self, view: &SpaceView<'_>, agent: AgentId) -> Vec<f32>;

    /// Called when the playground resets.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// Built-in sensors
// ---------------------------------------------------------------------------

/// Base pose and velocity: `[x, y, angle, vx, vy, angular]`.
#[derive(Debug, Clone, Default)]
pub struct PoseSensor;

impl Sensor for PoseSensor {
    fn name(&self) -> &str {
        "pose"
    }

    fn update(&mut self, view: &SpaceView<'_>, agent: AgentId) -> Vec<f32> {
        match (view.agent_pose(agent), view.agent_velocity(agent)) {
            (Some(p), Some((v, w))) => vec![p.position.x, p.position.y, p.angle, v.x, v.y, w],
            _ => vec![0.0; 6],
        }
    }
}

/// Distance to the nearest other entity within `range`, divided by `range`.
/// Reads `1.0` when nothing is in range.
#[derive(Debug, Clone)]
pub struct ProximitySensor {
    range: f32,
}

impl ProximitySensor {
    pub fn new(range: f32) -> Result<Self, ConfigError> {
        if !(range.is_finite() && range > 0.0) {
            return Err(ConfigError::invalid("range", "must be finite and > 0"));
        }
        Ok(Self { range })
    }
}

impl Sensor for ProximitySensor {
    fn name(&self) -> &str {
        "proximity"
    }

    fn update(&mut self, view: &SpaceView<'_>, agent: AgentId) -> Vec<f32> {
        let Some(pose) = view.agent_pose(agent) else {
            return vec![1.0];
        };
        let nearest = view
            .within(pose.position, self.range)
            .into_iter()
            .find(|s| s.owner.agent() != Some(agent))
            .map_or(1.0, |s| s.distance / self.range);
        vec![nearest]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorConfig {
    Pose,
    Proximity { range: f32 },
}

impl SensorConfig {
    pub fn build(&self) -> Result<Box<dyn Sensor>, ConfigError> {
        Ok(match self {
            Self::Pose => Box::new(PoseSensor),
            Self::Proximity { range } => Box::new(ProximitySensor::new(*range)?),
        })
    }
}
