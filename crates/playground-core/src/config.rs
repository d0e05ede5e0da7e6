use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_size() -> [f32; 2] {
    [300.0, 300.0]
}
const fn default_true() -> bool {
    true
}
const fn default_wall_thickness() -> f32 {
    10.0
}
const fn default_substeps() -> usize {
    4
}
const fn default_timestep() -> f32 {
    0.1
}
const fn default_linear_damping() -> f32 {
    1.0
}
const fn default_angular_damping() -> f32 {
    2.0
}
const fn default_placement_attempts() -> usize {
    20
}

// ---------------------------------------------------------------------------
// CheckMode
// ---------------------------------------------------------------------------

/// Policy for out-of-range actuator commands, shared by the whole playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Reject with a `CommandValidationError`.
    #[default]
    Hard,
    /// Clamp to the nearest valid value.
    Soft,
}

// ---------------------------------------------------------------------------
// PlaygroundConfig
// ---------------------------------------------------------------------------

/// Main playground configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    /// Width and height of the walled area.
    #[serde(default = "default_size")]
    pub size: [f32; 2],

    /// Surround the area with static walls.
    #[serde(default = "default_true")]
    pub walls: bool,

    #[serde(default = "default_wall_thickness")]
    pub wall_thickness: f32,

    /// Physics sub-steps per tick. Not observable from outside a tick.
    #[serde(default = "default_substeps")]
    pub substeps: usize,

    /// Simulated seconds per tick, split evenly over the sub-steps.
    #[serde(default = "default_timestep")]
    pub timestep: f32,

    /// Episode length in ticks. `None` runs until a termination flag.
    #[serde(default)]
    pub time_limit: Option<u64>,

    /// Root seed for every random draw of this instance.
    #[serde(default)]
    pub seed: u64,

    /// Gravity [x, y]. Top-down playgrounds leave this at zero.
    #[serde(default)]
    pub gravity: [f32; 2],

    #[serde(default = "default_linear_damping")]
    pub linear_damping: f32,

    #[serde(default = "default_angular_damping")]
    pub angular_damping: f32,

    #[serde(default)]
    pub check_mode: CheckMode,

    /// Bounded resampling for samplers, spawners and dispensers.
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: usize,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            walls: true,
            wall_thickness: default_wall_thickness(),
            substeps: default_substeps(),
            timestep: default_timestep(),
            time_limit: None,
            seed: 0,
            gravity: [0.0, 0.0],
            linear_damping: default_linear_damping(),
            angular_damping: default_angular_damping(),
            check_mode: CheckMode::default(),
            placement_attempts: default_placement_attempts(),
        }
    }
}

impl PlaygroundConfig {
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = [width, height];
        self
    }

    #[must_use]
    pub const fn with_check_mode(mut self, mode: CheckMode) -> Self {
        self.check_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_time_limit(mut self, ticks: u64) -> Self {
        self.time_limit = Some(ticks);
        self
    }

    #[must_use]
    pub const fn with_walls(mut self, walls: bool) -> Self {
        self.walls = walls;
        self
    }

    #[must_use]
    pub const fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps;
        self
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::invalid("size", "must be finite and > 0"));
        }
        if self.walls && self.wall_thickness <= 0.0 {
            return Err(ConfigError::invalid("wall_thickness", "must be > 0"));
        }
        if self.substeps == 0 {
            return Err(ConfigError::invalid("substeps", "must be >= 1"));
        }
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(ConfigError::invalid("timestep", "must be finite and > 0"));
        }
        if self.time_limit == Some(0) {
            return Err(ConfigError::invalid("time_limit", "must be >= 1"));
        }
        if self.linear_damping < 0.0 || self.angular_damping < 0.0 {
            return Err(ConfigError::invalid("damping", "must be >= 0"));
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::invalid("placement_attempts", "must be >= 1"));
        }
        Ok(())
    }

    /// Duration of one physics sub-step.
    #[allow(clippy::cast_precision_loss)]
    pub fn substep_dt(&self) -> f32 {
        self.timestep / self.substeps as f32
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
