use playground_core::{ConfigError, Contour};
use tracing::debug;

use super::{Activable, ActivationContext};
use crate::entity::EntityCore;
use crate::interaction::{ActivationCommand, Trigger};
use crate::mutation::Mutation;

/// Food that shrinks each time it is eaten.
///
/// Every bite pays the current reward, then reward and size are multiplied
/// by `shrink_ratio`. Once the next reward would be at or below
/// `|min_reward|` in magnitude the edible is removed instead of shrunk.
/// Negative rewards (rotten food) shrink toward zero the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Edible {
    initial_reward: f32,
    reward: f32,
    shrink_ratio: f32,
    min_reward: f32,
    trigger: Trigger,
    initial_contour: Option<Contour>,
    initial_mass: Option<f32>,
}

impl Edible {
    pub fn new(reward: f32, shrink_ratio: f32, min_reward: f32) -> Result<Self, ConfigError> {
        if !reward.is_finite() || !min_reward.is_finite() {
            return Err(ConfigError::invalid("reward", "must be finite"));
        }
        if !(shrink_ratio > 0.0 && shrink_ratio < 1.0) {
            return Err(ConfigError::invalid("shrink_ratio", "must be in (0, 1)"));
        }
        Ok(Self {
            initial_reward: reward,
            reward,
            shrink_ratio,
            min_reward,
            trigger: Trigger::Command(ActivationCommand::Eat),
            initial_contour: None,
            initial_mass: None,
        })
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub const fn reward(&self) -> f32 {
        self.reward
    }

    /// Keep the entity's shape so reset can undo shrinking.
    pub(crate) fn remember_shape(&mut self, core: &EntityCore) {
        self.initial_contour = Some(core.contour().clone());
        self.initial_mass = core.mass();
    }

    pub(crate) fn restore(&mut self, core: &mut EntityCore) {
        self.reward = self.initial_reward;
        if let Some(contour) = &self.initial_contour {
            core.contour = contour.clone();
            core.mass = self.initial_mass;
        }
    }
}

impl Activable for Edible {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn activate(&mut self, ctx: &ActivationContext) -> Vec<Mutation> {
        let bite = self.reward;
        self.reward *= self.shrink_ratio;
        let mut mutations = Vec::with_capacity(2);
        if let Some(agent) = ctx.by.agent() {
            mutations.push(Mutation::Reward {
                agent,
                amount: bite,
            });
        }
        if self.reward.abs() <= self.min_reward.abs() {
            debug!(element = ?ctx.id, "edible consumed");
            mutations.push(Mutation::Remove(ctx.id));
        } else {
            mutations.push(Mutation::Shrink {
                element: ctx.id,
                factor: self.shrink_ratio,
            });
        }
        mutations
    }
}
