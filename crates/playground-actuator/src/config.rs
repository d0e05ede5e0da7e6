use playground_core::ConfigError;
use playground_noise::prelude::NoiseConfig;
use serde::{Deserialize, Serialize};

use crate::actuator::{Actuator, ActuatorKind};
use crate::range::CommandRange;

/// Serializable command range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeConfig {
    Continuous { min: f32, max: f32 },
    Centered { max: f32 },
    Discrete { values: Vec<f32> },
    Boolean,
}

impl RangeConfig {
    pub fn build(&self) -> Result<CommandRange, ConfigError> {
        match self {
            Self::Continuous { min, max } => CommandRange::continuous(*min, *max),
            Self::Centered { max } => CommandRange::centered(*max),
            Self::Discrete { values } => CommandRange::discrete(values.clone()),
            Self::Boolean => Ok(CommandRange::boolean()),
        }
    }
}

/// One actuator entry in a part description.
///
/// ```toml
/// name = "forward"
/// kind = "linear_force"
/// max_force = 100.0
/// noise = { kind = "gaussian", std = 0.05 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: ActuatorKind,
    #[serde(default)]
    pub range: Option<RangeConfig>,
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
}

impl ActuatorConfig {
    pub fn new(name: impl Into<String>, kind: ActuatorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            range: None,
            noise: None,
        }
    }

    /// Build the actuator. All-or-nothing: any invalid field fails the whole entry.
    pub fn build(&self) -> Result<Actuator, ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField("actuator name".into()));
        }
        self.kind.validate()?;
        let mut actuator = Actuator::new(self.name.clone(), self.kind);
        if let Some(range) = &self.range {
            actuator = actuator.with_range(range.build()?);
        }
        if let Some(noise) = &self.noise {
            actuator = actuator.with_noise(noise)?;
        }
        Ok(actuator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ForceAxis;

    #[test]
    fn parses_linear_force_with_noise() {
        let cfg: ActuatorConfig = toml::from_str(
            r#"
            name = "forward"
            kind = "linear_force"
            max_force = 100.0
            noise = { kind = "gaussian", std = 0.05 }
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.kind,
            ActuatorKind::LinearForce {
                axis: ForceAxis::Forward,
                max_force: 100.0
            }
        );
        let actuator = cfg.build().unwrap();
        assert!(actuator.has_noise());
    }

    #[test]
    fn parses_discrete_range() {
        let cfg: ActuatorConfig = toml::from_str(
            r#"
            name = "gear"
            kind = "joint_motor"
            range = { type = "discrete", values = [-1.0, 0.0, 1.0] }
            "#,
        )
        .unwrap();
        let actuator = cfg.build().unwrap();
        assert!(actuator.range().is_discrete());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let parsed: Result<ActuatorConfig, _> = toml::from_str(
            r#"
            name = "x"
            kind = "teleport"
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_range_fails_build() {
        let cfg = ActuatorConfig {
            range: Some(RangeConfig::Continuous { min: 1.0, max: 0.0 }),
            ..ActuatorConfig::new("turn", ActuatorKind::JointMotor)
        };
        assert!(matches!(cfg.build(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn empty_name_is_missing_field() {
        let cfg = ActuatorConfig::new("", ActuatorKind::Eat);
        assert!(matches!(cfg.build(), Err(ConfigError::MissingField(_))));
    }
}
