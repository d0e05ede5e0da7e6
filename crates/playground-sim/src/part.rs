//! Rigid parts of an agent and their pivots.

use playground_actuator::prelude::Actuator;
use playground_core::types::{rotate, wrap_angle};
use playground_core::{ConfigError, Contour, Coordinates};
use playground_physics::prelude::{ImpulseJointHandle, PivotSpec};

use crate::entity::EntityCore;

/// The motor is cut when the relative angle is within
/// `rotation_range / GUARD_BAND_DIVISOR` of a limit and the command pushes
/// further into it.
pub const GUARD_BAND_DIVISOR: f32 = 20.0;

/// How a part hangs off its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mount {
    pub anchor: usize,
    pub pivot: PivotSpec,
    pub max_angular_velocity: f32,
}

/// One rigid body of an agent. The base has no mount.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    pub core: EntityCore,
    mount: Option<Mount>,
    pub(crate) joint: Option<ImpulseJointHandle>,
    pub(crate) actuators: Vec<Actuator>,
    /// Radius added around the contour for the grasp halo.
    pub grasp_range: f32,
}

impl Part {
    pub fn new(name: impl Into<String>, contour: Contour, mass: f32) -> Result<Self, ConfigError> {
        let mut core = EntityCore::new(contour);
        core.set_mass(mass)?;
        Ok(Self {
            name: name.into(),
            core,
            mount: None,
            joint: None,
            actuators: Vec::new(),
            grasp_range: 0.0,
        })
    }

    /// Hang this part off `mount.anchor`.
    pub fn mounted(mut self, mount: Mount) -> Result<Self, ConfigError> {
        let p = &mount.pivot;
        if !(p.rotation_range.is_finite() && p.rotation_range > 0.0) {
            return Err(ConfigError::invalid("rotation_range", "must be finite and > 0"));
        }
        if !(mount.max_angular_velocity.is_finite() && mount.max_angular_velocity >= 0.0) {
            return Err(ConfigError::invalid(
                "max_angular_velocity",
                "must be finite and >= 0",
            ));
        }
        self.mount = Some(mount);
        Ok(self)
    }

    #[must_use]
    pub fn with_actuator(mut self, actuator: Actuator) -> Self {
        self.actuators.push(actuator);
        self
    }

    pub fn with_grasp_range(mut self, range: f32) -> Result<Self, ConfigError> {
        if !(range.is_finite() && range >= 0.0) {
            return Err(ConfigError::invalid("grasp_range", "must be finite and >= 0"));
        }
        self.grasp_range = range;
        Ok(self)
    }

    pub fn with_interaction_range(mut self, range: f32) -> Result<Self, ConfigError> {
        self.core.set_interaction_range(range)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn mount(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    #[must_use]
    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    #[must_use]
    pub const fn joint(&self) -> Option<ImpulseJointHandle> {
        self.joint
    }

    /// Pose that makes the pivots coincide, with the relative angle at rest.
    #[must_use]
    pub fn placed_from(&self, anchor: Coordinates) -> Option<Coordinates> {
        let mount = self.mount.as_ref()?;
        let angle = anchor.angle + mount.pivot.angle_offset;
        let position = anchor.position + rotate(mount.pivot.pivot_on_anchor, anchor.angle)
            - rotate(mount.pivot.pivot_on_part, angle);
        Some(Coordinates::new(position, angle))
    }

    /// Motor target for a command `rate` given the measured relative angle.
    ///
    /// The angle is wrapped to `[-π, π]` and measured from `angle_offset`.
    /// Unlimited pivots are never cut.
    #[must_use]
    pub fn motor_velocity(&self, rate: f32, relative_angle: f32) -> f32 {
        let Some(mount) = &self.mount else {
            return 0.0;
        };
        let pivot = &mount.pivot;
        if pivot.is_limited() {
            let from_rest = wrap_angle(relative_angle - pivot.angle_offset);
            let half = pivot.rotation_range / 2.0;
            let guard = pivot.rotation_range / GUARD_BAND_DIVISOR;
            if (rate > 0.0 && from_rest >= half - guard) || (rate < 0.0 && from_rest <= guard - half) {
                return 0.0;
            }
        }
        rate * mount.max_angular_velocity
    }
}
