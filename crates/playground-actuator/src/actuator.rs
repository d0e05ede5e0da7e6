//! A named command channel on an agent part.

use playground_core::{CheckMode, CommandValidationError, ConfigError};
use playground_noise::prelude::{FlipNoise, NoiseConfig, NoiseError, NoiseModel};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::range::CommandRange;

// ---------------------------------------------------------------------------
// ActuatorKind
// ---------------------------------------------------------------------------

/// Local axis a linear force acts along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceAxis {
    /// Local +x.
    #[default]
    Forward,
    /// Local +y.
    Lateral,
}

/// What a committed value does to the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Force of `command * max_force` along a local axis of the part.
    LinearForce {
        #[serde(default)]
        axis: ForceAxis,
        max_force: f32,
    },
    /// Angular velocity of `command * max_angular_velocity` on the part.
    AngularVelocity { max_angular_velocity: f32 },
    /// Motor rate of the part's pivot, scaled by the part's max angular velocity.
    JointMotor,
    /// Hold graspable elements inside the part's grasp halo.
    Grasp,
    /// Activate activables inside the part's interaction halo.
    Activate,
    /// Eat edibles inside the part's interaction halo.
    Eat,
}

impl ActuatorKind {
    #[must_use]
    pub const fn forward_force(max_force: f32) -> Self {
        Self::LinearForce {
            axis: ForceAxis::Forward,
            max_force,
        }
    }

    #[must_use]
    pub const fn lateral_force(max_force: f32) -> Self {
        Self::LinearForce {
            axis: ForceAxis::Lateral,
            max_force,
        }
    }

    /// Range used when none is configured.
    #[must_use]
    pub fn default_range(&self) -> CommandRange {
        match self {
            Self::LinearForce { .. } | Self::AngularVelocity { .. } | Self::JointMotor => {
                CommandRange::Continuous {
                    min: -1.0,
                    max: 1.0,
                }
            }
            Self::Grasp | Self::Activate | Self::Eat => CommandRange::boolean(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::LinearForce { max_force, .. } if !max_force.is_finite() || *max_force <= 0.0 => {
                Err(ConfigError::invalid("max_force", "must be finite and > 0"))
            }
            Self::AngularVelocity {
                max_angular_velocity,
            } if !max_angular_velocity.is_finite() || *max_angular_velocity <= 0.0 => Err(
                ConfigError::invalid("max_angular_velocity", "must be finite and > 0"),
            ),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum CommandNoise {
    Additive(NoiseModel),
    Flip(FlipNoise),
}

/// Named actuator with its current committed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuator {
    name: String,
    kind: ActuatorKind,
    range: CommandRange,
    noise: Option<CommandNoise>,
    command: f32,
}

impl Actuator {
    pub fn new(name: impl Into<String>, kind: ActuatorKind) -> Self {
        let range = kind.default_range();
        let command = range.default_value();
        Self {
            name: name.into(),
            kind,
            range,
            noise: None,
            command,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: CommandRange) -> Self {
        self.command = range.default_value();
        self.range = range;
        self
    }

    /// Attach noise. Additive noise needs a continuous range, flip noise a
    /// discrete one.
    pub fn with_noise(mut self, noise: &NoiseConfig) -> Result<Self, ConfigError> {
        let invalid = |e: NoiseError| ConfigError::invalid("noise", e.to_string());
        let flip = noise.build_flip().map_err(invalid)?;
        let built = match (self.range.is_discrete(), flip) {
            (true, Some(flip)) => CommandNoise::Flip(flip),
            (false, None) => match noise.build_model().map_err(invalid)? {
                Some(model) => CommandNoise::Additive(model),
                None => return Ok(self),
            },
            _ => {
                return Err(ConfigError::invalid(
                    "noise",
                    format!(
                        "{} noise does not fit the range of `{}`",
                        kind_name(noise),
                        self.name
                    ),
                ));
            }
        };
        self.noise = Some(built);
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &ActuatorKind {
        &self.kind
    }

    #[must_use]
    pub const fn range(&self) -> &CommandRange {
        &self.range
    }

    #[must_use]
    pub const fn command(&self) -> f32 {
        self.command
    }

    /// Whether the command is away from its inactive default.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.command != self.range.default_value()
    }

    /// Back to the inactive default. Called at the start of every tick.
    pub fn reset_command(&mut self) {
        self.command = self.range.default_value();
    }

    /// Validate and store `value`. On error the previous command is kept.
    pub fn set_command(&mut self, value: f32, mode: CheckMode) -> Result<(), CommandValidationError> {
        self.command = self.range.validate(value, mode)?;
        Ok(())
    }

    /// Perturb the committed value. Never leaves the range.
    pub fn apply_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match (&mut self.noise, &self.range) {
            (Some(CommandNoise::Additive(model)), CommandRange::Continuous { min, max }) => {
                self.command = model.apply_clamped(self.command, *min, *max, rng);
            }
            (Some(CommandNoise::Flip(flip)), CommandRange::Discrete { values }) => {
                self.command = flip.apply(self.command, values, rng);
            }
            _ => {}
        }
    }

    /// Redraw per-episode noise state.
    pub fn reset_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(CommandNoise::Additive(model)) = &mut self.noise {
            model.reset(rng);
        }
    }

    #[must_use]
    pub const fn has_noise(&self) -> bool {
        self.noise.is_some()
    }
}

fn kind_name(noise: &NoiseConfig) -> &'static str {
    match noise {
        NoiseConfig::Flip { .. } => "flip",
        _ => "additive",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use playground_test_utils::seeded_rng;

    #[test]
    fn new_actuator_starts_at_default() {
        let a = Actuator::new("grasp", ActuatorKind::Grasp);
        assert_eq!(a.command(), 0.0);
        assert!(!a.is_active());
        assert!(a.range().is_discrete());
    }

    #[test]
    fn centered_actuator_range_enforcement() {
        let mut a = Actuator::new("forward", ActuatorKind::forward_force(10.0));
        assert!(a.range().is_centered());

        assert!(matches!(
            a.set_command(1.5, CheckMode::Hard),
            Err(CommandValidationError::OutOfRange { .. })
        ));
        assert_eq!(a.command(), 0.0);

        a.set_command(1.5, CheckMode::Soft).unwrap();
        assert_eq!(a.command(), 1.0);

        a.set_command(-0.25, CheckMode::Hard).unwrap();
        assert_eq!(a.command(), -0.25);
    }

    #[test]
    fn reset_command_restores_default() {
        let mut a = Actuator::new("eat", ActuatorKind::Eat);
        a.set_command(1.0, CheckMode::Hard).unwrap();
        assert!(a.is_active());
        a.reset_command();
        assert!(!a.is_active());
    }

    #[test]
    fn noise_never_leaves_range() {
        let mut a = Actuator::new("forward", ActuatorKind::forward_force(10.0))
            .with_noise(&NoiseConfig::Gaussian {
                mean: 0.0,
                std: 2.0,
            })
            .unwrap();
        let mut rng = seeded_rng(3);
        for _ in 0..200 {
            a.set_command(0.9, CheckMode::Hard).unwrap();
            a.apply_noise(&mut rng);
            assert!((-1.0..=1.0).contains(&a.command()));
        }
    }

    #[test]
    fn certain_flip_inverts_boolean() {
        let mut a = Actuator::new("activate", ActuatorKind::Activate)
            .with_noise(&NoiseConfig::Flip { probability: 1.0 })
            .unwrap();
        let mut rng = seeded_rng(1);
        a.set_command(1.0, CheckMode::Hard).unwrap();
        a.apply_noise(&mut rng);
        assert_eq!(a.command(), 0.0);
    }

    #[test]
    fn mismatched_noise_rejected() {
        let flip_on_continuous = Actuator::new("turn", ActuatorKind::JointMotor)
            .with_noise(&NoiseConfig::Flip { probability: 0.1 });
        assert!(flip_on_continuous.is_err());

        let gauss_on_discrete = Actuator::new("grasp", ActuatorKind::Grasp).with_noise(
            &NoiseConfig::Gaussian {
                mean: 0.0,
                std: 0.1,
            },
        );
        assert!(gauss_on_discrete.is_err());
    }

    #[test]
    fn kind_validation() {
        assert!(ActuatorKind::forward_force(0.0).validate().is_err());
        assert!(
            ActuatorKind::AngularVelocity {
                max_angular_velocity: f32::NAN
            }
            .validate()
            .is_err()
        );
        assert!(ActuatorKind::Grasp.validate().is_ok());
    }
}
