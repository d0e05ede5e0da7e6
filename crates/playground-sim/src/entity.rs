//! State shared by every simulated object: shape, mass, flags, placement and
//! lifecycle.

use playground_core::{
    ConfigError, Contour, ContourConfig, Coordinates, CoordinatesConfig, Teams,
};
use playground_physics::prelude::{BodyKind, RigidBodyHandle};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampler::CoordinateSampler;
use crate::trajectory::{Trajectory, TrajectoryConfig};

/// Behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityFlags {
    /// Removed for good on removal or reset.
    pub temporary: bool,
    /// Shape is a sensor with no physical response.
    pub traversable: bool,
    /// Ignored by sensors.
    pub transparent: bool,
    /// Can be held by an agent's grasp.
    pub graspable: bool,
    /// Activates touch-triggered elements it collides with.
    pub trigger: bool,
}

/// Where an entity goes on (re)attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Fixed(Coordinates),
    Sampler(CoordinateSampler),
    Trajectory(Trajectory),
}

impl Default for Placement {
    fn default() -> Self {
        Self::Fixed(Coordinates::default())
    }
}

impl Placement {
    /// Coordinates for the next attachment. Trajectories restart.
    pub fn initial<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Coordinates {
        match self {
            Self::Fixed(c) => *c,
            Self::Sampler(s) => s.sample(rng),
            Self::Trajectory(t) => {
                t.reset();
                t.current()
            }
        }
    }

    /// Sampled placements may be retried on overlap.
    #[must_use]
    pub const fn is_sampled(&self) -> bool {
        matches!(self, Self::Sampler(_))
    }
}

/// Serialised [`Placement`]: at most one of the three forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinatesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<CoordinateSampler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<TrajectoryConfig>,
}

impl PlacementConfig {
    pub fn build(&self) -> Result<Placement, ConfigError> {
        match (&self.coordinates, &self.sampler, &self.trajectory) {
            (Some(c), None, None) => Ok(Placement::Fixed((*c).into())),
            (None, Some(s), None) => {
                s.validate()?;
                Ok(Placement::Sampler(s.clone()))
            }
            (None, None, Some(t)) => Ok(Placement::Trajectory(Trajectory::from_config(t)?)),
            (None, None, None) => Ok(Placement::default()),
            _ => Err(ConfigError::invalid(
                "placement",
                "set only one of coordinates, sampler, trajectory",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifeState {
    /// Built, never attached.
    #[default]
    Detached,
    Attached,
    /// Detached but retained; comes back on reset.
    Removed,
}

/// Identity, geometry and lifecycle of one rigid body.
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub name: Option<String>,
    pub teams: Teams,
    pub flags: EntityFlags,
    pub(crate) contour: Contour,
    /// `Some` makes the entity movable.
    pub(crate) mass: Option<f32>,
    pub placement: Placement,
    /// Halo margin for interaction sensors. `0` means no halo.
    pub interaction_range: f32,
    pub(crate) state: LifeState,
    pub(crate) body: Option<RigidBodyHandle>,
    pub(crate) visible: bool,
    pub(crate) needs_sprite_update: bool,
}

impl EntityCore {
    pub fn new(contour: Contour) -> Self {
        Self {
            name: None,
            teams: Teams::none(),
            flags: EntityFlags::default(),
            contour,
            mass: None,
            placement: Placement::default(),
            interaction_range: 0.0,
            state: LifeState::Detached,
            body: None,
            visible: true,
            needs_sprite_update: true,
        }
    }

    pub fn from_config(config: &EntityConfig) -> Result<Self, ConfigError> {
        let mut core = Self::new(Contour::from_config(&config.contour)?);
        core.name.clone_from(&config.name);
        core.teams = config.teams.clone();
        core.flags = config.flags;
        core.placement = config.placement.build()?;
        if let Some(mass) = config.mass {
            core.set_mass(mass)?;
        }
        core.set_interaction_range(config.interaction_range)?;
        Ok(core)
    }

    /// Make the entity movable with this mass.
    pub fn set_mass(&mut self, mass: f32) -> Result<(), ConfigError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::invalid("mass", "must be finite and > 0"));
        }
        self.mass = Some(mass);
        Ok(())
    }

    pub fn set_interaction_range(&mut self, range: f32) -> Result<(), ConfigError> {
        if !(range.is_finite() && range >= 0.0) {
            return Err(ConfigError::invalid("interaction_range", "must be finite and >= 0"));
        }
        self.interaction_range = range;
        Ok(())
    }

    #[must_use]
    pub const fn contour(&self) -> &Contour {
        &self.contour
    }

    #[must_use]
    pub const fn mass(&self) -> Option<f32> {
        self.mass
    }

    #[must_use]
    pub const fn movable(&self) -> bool {
        self.mass.is_some()
    }

    #[must_use]
    pub const fn state(&self) -> LifeState {
        self.state
    }

    #[must_use]
    pub const fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        matches!(self.state, LifeState::Attached)
    }

    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn body_kind(&self) -> BodyKind {
        match (&self.placement, self.mass) {
            (Placement::Trajectory(_), _) => BodyKind::Kinematic,
            (_, Some(_)) => BodyKind::Dynamic,
            (_, None) => BodyKind::Fixed,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.needs_sprite_update = true;
        }
    }

    /// Shrink or grow by `factor`. Linear size and mass both scale by
    /// `factor`, the same ratio an edible applies to its reward; density is
    /// not preserved.
    pub(crate) fn rescale(&mut self, factor: f32) {
        self.contour = self.contour.scaled(factor);
        self.mass = self.mass.map(|m| m * factor);
        self.needs_sprite_update = true;
    }
}

/// Serialised fields common to every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub contour: ContourConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f32>,
    #[serde(default)]
    pub teams: Teams,
    #[serde(flatten)]
    pub flags: EntityFlags,
    #[serde(flatten)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub interaction_range: f32,
}

impl EntityConfig {
    #[must_use]
    pub fn new(contour: ContourConfig) -> Self {
        Self {
            name: None,
            contour,
            mass: None,
            teams: Teams::none(),
            flags: EntityFlags::default(),
            placement: PlacementConfig::default(),
            interaction_range: 0.0,
        }
    }
}
