//! Valid-value policies for actuator commands.

use playground_core::{CheckMode, CommandValidationError, ConfigError};

/// Set of values an actuator accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRange {
    /// Any value in `[min, max]`. Centred when `min == -max`.
    Continuous { min: f32, max: f32 },
    /// One of `values`, sorted ascending. `{0, 1}` is the boolean range.
    Discrete { values: Vec<f32> },
}

impl CommandRange {
    pub fn continuous(min: f32, max: f32) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::invalid(
                "range",
                format!("continuous range needs finite min < max, got [{min}, {max}]"),
            ));
        }
        Ok(Self::Continuous { min, max })
    }

    /// `[-max, max]`.
    pub fn centered(max: f32) -> Result<Self, ConfigError> {
        Self::continuous(-max, max)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::Discrete {
            values: vec![0.0, 1.0],
        }
    }

    pub fn discrete(mut values: Vec<f32>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::invalid("range", "discrete range needs at least one value"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid("range", "discrete values must be finite"));
        }
        values.sort_by(f32::total_cmp);
        values.dedup();
        Ok(Self::Discrete { values })
    }

    #[must_use]
    pub fn is_centered(&self) -> bool {
        matches!(self, Self::Continuous { min, max } if *min == -*max)
    }

    #[must_use]
    pub const fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete { .. })
    }

    /// Inactive value: 0, or the allowed value closest to it.
    #[must_use]
    pub fn default_value(&self) -> f32 {
        self.clamp(0.0)
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        match self {
            Self::Continuous { min, max } => (*min..=*max).contains(&value),
            Self::Discrete { values } => values.contains(&value),
        }
    }

    /// Nearest valid value. Discrete ties resolve to the smaller value.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        match self {
            Self::Continuous { min, max } => value.clamp(*min, *max),
            Self::Discrete { values } => values
                .iter()
                .copied()
                .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
                .unwrap_or(value),
        }
    }

    /// Bounds of the range. Discrete ranges span their extreme values.
    #[must_use]
    pub fn bounds(&self) -> (f32, f32) {
        match self {
            Self::Continuous { min, max } => (*min, *max),
            Self::Discrete { values } => (
                values.first().copied().unwrap_or(0.0),
                values.last().copied().unwrap_or(0.0),
            ),
        }
    }

    /// Check `value` under `mode`. Non-finite values are rejected in both modes.
    pub fn validate(&self, value: f32, mode: CheckMode) -> Result<f32, CommandValidationError> {
        if !value.is_finite() {
            return Err(CommandValidationError::NotFinite);
        }
        if self.contains(value) {
            return Ok(value);
        }
        match (mode, self) {
            (CheckMode::Soft, _) => Ok(self.clamp(value)),
            (CheckMode::Hard, Self::Continuous { min, max }) => {
                Err(CommandValidationError::OutOfRange {
                    value,
                    min: *min,
                    max: *max,
                })
            }
            (CheckMode::Hard, Self::Discrete { .. }) => {
                Err(CommandValidationError::NotAllowed { value })
            }
        }
    }
}
