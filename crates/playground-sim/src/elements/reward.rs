//! Contacts and zones that pay out reward.

use playground_core::ConfigError;

use super::Rewarding;

/// Optional cap on the total reward an element pays out per episode.
///
/// Payouts are clamped so the remaining budget reaches zero without
/// changing sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBudget {
    total: Option<f32>,
    remaining: Option<f32>,
}

impl RewardBudget {
    pub const UNLIMITED: Self = Self {
        total: None,
        remaining: None,
    };

    /// `total` must share the sign of the reward it caps.
    pub fn new(reward: f32, total: Option<f32>) -> Result<Self, ConfigError> {
        if let Some(t) = total {
            if !t.is_finite() {
                return Err(ConfigError::invalid("total_reward", "must be finite"));
            }
            if t != 0.0 && reward != 0.0 && t.signum() != reward.signum() {
                return Err(ConfigError::invalid(
                    "total_reward",
                    "must have the same sign as reward",
                ));
            }
        }
        Ok(Self {
            total,
            remaining: total,
        })
    }

    /// Amount actually paid for a requested `reward`.
    pub fn take(&mut self, reward: f32) -> f32 {
        let Some(remaining) = self.remaining.as_mut() else {
            return reward;
        };
        let paid = reward.signum() * reward.abs().min(remaining.abs());
        *remaining -= paid;
        if remaining.abs() < f32::EPSILON {
            *remaining = 0.0;
        }
        paid
    }

    #[must_use]
    pub const fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    pub const fn reset(&mut self) {
        self.remaining = self.total;
    }
}

fn finite(reward: f32) -> Result<f32, ConfigError> {
    if reward.is_finite() {
        Ok(reward)
    } else {
        Err(ConfigError::invalid("reward", "must be finite"))
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Pays out once and disappears (candy, poison).
#[derive(Debug, Clone, PartialEq)]
pub struct Absorbable {
    reward: f32,
    provided: bool,
}

impl Absorbable {
    #[must_use]
    pub const fn new(reward: f32) -> Self {
        Self {
            reward,
            provided: false,
        }
    }

    #[must_use]
    pub const fn reward(&self) -> f32 {
        self.reward
    }
}

impl Rewarding for Absorbable {
    fn provide(&mut self) -> Option<f32> {
        if self.provided {
            return None;
        }
        self.provided = true;
        Some(self.reward)
    }

    fn new_tick(&mut self) {
        self.provided = false;
    }
}

/// Pays out and ends the episode on contact.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalContact {
    reward: f32,
    provided: bool,
}

impl TerminalContact {
    #[must_use]
    pub const fn new(reward: f32) -> Self {
        Self {
            reward,
            provided: false,
        }
    }
}

impl Rewarding for TerminalContact {
    fn provide(&mut self) -> Option<f32> {
        if self.provided {
            return None;
        }
        self.provided = true;
        Some(self.reward)
    }

    fn terminal(&self) -> bool {
        true
    }

    fn new_tick(&mut self) {
        self.provided = false;
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Pays `reward` every tick an agent is inside, within an optional budget.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardZone {
    reward: f32,
    budget: RewardBudget,
    reward_provided: bool,
}

impl RewardZone {
    pub fn new(reward: f32, total_reward: Option<f32>) -> Result<Self, ConfigError> {
        let reward = finite(reward)?;
        Ok(Self {
            reward,
            budget: RewardBudget::new(reward, total_reward)?,
            reward_provided: false,
        })
    }

    #[must_use]
    pub const fn remaining(&self) -> Option<f32> {
        self.budget.remaining()
    }
}

impl Rewarding for RewardZone {
    fn provide(&mut self) -> Option<f32> {
        if self.reward_provided {
            return None;
        }
        self.reward_provided = true;
        Some(self.budget.take(self.reward))
    }

    fn new_tick(&mut self) {
        self.reward_provided = false;
    }

    fn reset(&mut self) {
        self.budget.reset();
    }
}

/// Goal or death zone: pays once and ends the episode.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalZone {
    reward: f32,
    reward_provided: bool,
}

impl TerminalZone {
    pub fn new(reward: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            reward: finite(reward)?,
            reward_provided: false,
        })
    }
}

impl Rewarding for TerminalZone {
    fn provide(&mut self) -> Option<f32> {
        if self.reward_provided {
            return None;
        }
        self.reward_provided = true;
        Some(self.reward)
    }

    fn terminal(&self) -> bool {
        true
    }

    fn new_tick(&mut self) {
        self.reward_provided = false;
    }
}
