use thiserror::Error;

/// Top-level error type for the playground.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Command validation error: {0}")]
    Command(#[from] CommandValidationError),

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

/// Construction-time configuration errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Inconsistent contour: {0}")]
    InvalidContour(String),

    #[error("Unknown {category} type: {name}")]
    UnknownType {
        category: &'static str,
        name: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Recoverable placement failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlacementError {
    #[error("Position ({x:.2}, {y:.2}) overlaps another solid shape")]
    Overlap { x: f32, y: f32 },

    #[error("No free position found after {attempts} attempts")]
    AttemptsExhausted { attempts: usize },
}

/// Out-of-range actuator commands.
///
/// Copy + no heap data so validation stays allocation free.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CommandValidationError {
    #[error("Command is NaN or infinite")]
    NotFinite,

    #[error("Command {value} outside [{min}, {max}]")]
    OutOfRange { value: f32, min: f32, max: f32 },

    #[error("Command {value} is not an allowed discrete value")]
    NotAllowed { value: f32 },
}

/// Programmer errors: operating on entities in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("Entity {0} has been removed")]
    Removed(String),

    #[error("Entity {0} was temporary and has been destroyed")]
    Destroyed(String),

    #[error("Name already registered: {0}")]
    DuplicateName(String),

    #[error("Shape {0} has no registered owner")]
    UnregisteredShape(u32),

    #[error("Unknown id: {0}")]
    UnknownId(String),

    #[error("Episode is over; reset before stepping again")]
    EpisodeOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playground_error_from_config_error() {
        let err = ConfigError::MissingField("radius".into());
        let top: PlaygroundError = err.into();
        assert!(matches!(top, PlaygroundError::Config(_)));
        assert!(top.to_string().contains("radius"));
    }

    #[test]
    fn playground_error_from_placement_error() {
        let top: PlaygroundError = PlacementError::AttemptsExhausted { attempts: 7 }.into();
        assert!(matches!(top, PlaygroundError::Placement(_)));
        assert!(top.to_string().contains('7'));
    }

    #[test]
    fn playground_error_from_command_error() {
        let err = CommandValidationError::OutOfRange {
            value: 1.5,
            min: -1.0,
            max: 1.0,
        };
        let top: PlaygroundError = err.into();
        assert!(matches!(top, PlaygroundError::Command(_)));
        assert!(top.to_string().contains("1.5"));
    }

    #[test]
    fn playground_error_from_invariant_error() {
        let top: PlaygroundError = InvariantError::DuplicateName("agent".into()).into();
        assert!(matches!(top, PlaygroundError::Invariant(_)));
        assert!(top.to_string().contains("agent"));
    }

    #[test]
    fn unknown_type_message() {
        let err = ConfigError::UnknownType {
            category: "element",
            name: "banana".into(),
        };
        assert_eq!(err.to_string(), "Unknown element type: banana");
    }

    #[test]
    fn command_error_is_copy() {
        let err = CommandValidationError::NotFinite;
        let copy = err;
        assert_eq!(err, copy);
    }

    #[test]
    fn episode_over_mentions_reset() {
        assert!(InvariantError::EpisodeOver.to_string().contains("reset"));
    }

    #[test]
    fn invalid_helper_builds_invalid_value() {
        let err = ConfigError::invalid("substeps", "must be >= 1");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("substeps"));
    }
}
