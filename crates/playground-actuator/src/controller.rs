//! Input-polling controllers.
//!
//! A controller is asked for a full set of commands once per tick. Mapping
//! keyboards, gamepads or policies onto values happens outside the engine.

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::actuator::Actuator;
use crate::range::CommandRange;

/// Actuator name → committed value for one agent and one tick.
pub type CommandMap = BTreeMap<String, f32>;

/// Produces commands for an agent's actuators.
pub trait Controller: Send {
    fn generate_commands(&mut self, actuators: &[&Actuator]) -> CommandMap;

    /// Called when the playground resets.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// RandomController
// ---------------------------------------------------------------------------

/// Uniform samples over each actuator's range.
#[derive(Debug, Clone)]
pub struct RandomController {
    rng: ChaCha8Rng,
}

impl RandomController {
    #[must_use]
    pub const fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Controller for RandomController {
    fn generate_commands(&mut self, actuators: &[&Actuator]) -> CommandMap {
        actuators
            .iter()
            .map(|a| {
                let value = match a.range() {
                    CommandRange::Continuous { min, max } => self.rng.gen_range(*min..=*max),
                    CommandRange::Discrete { values } => values[self.rng.gen_range(0..values.len())],
                };
                (a.name().to_owned(), value)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ConstantController
// ---------------------------------------------------------------------------

/// Replays the same commands every tick. Missing actuators stay at default.
#[derive(Debug, Clone, Default)]
pub struct ConstantController {
    commands: CommandMap,
}

impl ConstantController {
    #[must_use]
    pub const fn new(commands: CommandMap) -> Self {
        Self { commands }
    }

    pub fn set(&mut self, actuator: impl Into<String>, value: f32) {
        self.commands.insert(actuator.into(), value);
    }
}

impl Controller for ConstantController {
    fn generate_commands(&mut self, actuators: &[&Actuator]) -> CommandMap {
        actuators
            .iter()
            .filter_map(|a| self.commands.get_key_value(a.name()))
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorKind;
    use playground_core::CheckMode;
    use playground_test_utils::seeded_rng;

    fn actuators() -> Vec<Actuator> {
        vec![
            Actuator::new("forward", ActuatorKind::forward_force(10.0)),
            Actuator::new("grasp", ActuatorKind::Grasp),
        ]
    }

    #[test]
    fn random_commands_are_valid() {
        let acts = actuators();
        let refs: Vec<&Actuator> = acts.iter().collect();
        let mut c = RandomController::new(seeded_rng(4));
        for _ in 0..100 {
            let commands = c.generate_commands(&refs);
            assert_eq!(commands.len(), 2);
            for a in &acts {
                let mut probe = a.clone();
                assert!(probe.set_command(commands[a.name()], CheckMode::Hard).is_ok());
            }
        }
    }

    #[test]
    fn random_controller_is_reproducible() {
        let acts = actuators();
        let refs: Vec<&Actuator> = acts.iter().collect();
        let mut a = RandomController::new(seeded_rng(8));
        let mut b = RandomController::new(seeded_rng(8));
        for _ in 0..10 {
            assert_eq!(a.generate_commands(&refs), b.generate_commands(&refs));
        }
    }

    #[test]
    fn constant_controller_only_reports_known_actuators() {
        let acts = actuators();
        let refs: Vec<&Actuator> = acts.iter().collect();
        let mut c = ConstantController::default();
        c.set("forward", 0.5);
        c.set("jump", 1.0);
        let commands = c.generate_commands(&refs);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands["forward"], 0.5);
    }
}
