//! Keys, coins and what they open.

use super::config::ElementConfig;
use super::ActivationContext;
use crate::ids::{AgentId, ElementId};
use crate::mutation::{DoorAction, Mutation, Origin, Spawn};

/// What a gem element offers to a gem-activated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gem<'a> {
    Key(&'a str),
    Coin { holder: Option<AgentId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    key_id: String,
}

impl Key {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
        }
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Currency for vending machines. Remembers the last agent that held it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coin {
    last_holder: Option<AgentId>,
}

impl Coin {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_holder: None }
    }

    #[must_use]
    pub const fn last_holder(&self) -> Option<AgentId> {
        self.last_holder
    }

    pub(crate) const fn held_by(&mut self, agent: AgentId) {
        self.last_holder = Some(agent);
    }

    pub(crate) const fn reset(&mut self) {
        self.last_holder = None;
    }
}

fn matches_key(gem: &Gem<'_>, key_id: &str) -> bool {
    matches!(gem, Gem::Key(k) if *k == key_id)
}

/// Opens a door when its key touches it. Key and lock are both consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    key_id: String,
    door: ElementId,
}

impl Lock {
    pub fn new(key_id: impl Into<String>, door: ElementId) -> Self {
        Self {
            key_id: key_id.into(),
            door,
        }
    }

    pub(crate) fn accept(
        &self,
        ctx: &ActivationContext,
        gem_id: ElementId,
        gem: &Gem<'_>,
    ) -> Option<Vec<Mutation>> {
        matches_key(gem, &self.key_id).then(|| {
            vec![
                Mutation::Remove(gem_id),
                Mutation::Remove(ctx.id),
                Mutation::Door {
                    door: self.door,
                    action: DoorAction::Open,
                },
            ]
        })
    }
}

/// Releases its treasure at its own coordinates when unlocked.
#[derive(Debug, Clone, PartialEq)]
pub struct Chest {
    key_id: String,
    treasure: Box<ElementConfig>,
}

impl Chest {
    pub fn new(key_id: impl Into<String>, treasure: ElementConfig) -> Self {
        Self {
            key_id: key_id.into(),
            treasure: Box::new(treasure),
        }
    }

    pub(crate) fn accept(
        &self,
        ctx: &ActivationContext,
        gem_id: ElementId,
        gem: &Gem<'_>,
    ) -> Option<Vec<Mutation>> {
        if !matches_key(gem, &self.key_id) {
            return None;
        }
        let mut mutations = vec![Mutation::Remove(gem_id), Mutation::Remove(ctx.id)];
        match self.treasure.build(&|_| None) {
            Ok(mut treasure) => {
                treasure.core.flags.temporary = true;
                mutations.push(Mutation::Add {
                    element: Box::new(treasure),
                    spawn: Spawn::At(ctx.coordinates),
                    origin: Origin::Chest(ctx.id),
                });
            }
            Err(err) => tracing::warn!(chest = ?ctx.id, %err, "cannot build treasure"),
        }
        Some(mutations)
    }
}

/// Swallows coins and rewards the agent that last held each one.
#[derive(Debug, Clone, PartialEq)]
pub struct VendingMachine {
    reward: f32,
}

impl VendingMachine {
    #[must_use]
    pub const fn new(reward: f32) -> Self {
        Self { reward }
    }

    pub(crate) fn accept(
        &self,
        _ctx: &ActivationContext,
        gem_id: ElementId,
        gem: &Gem<'_>,
    ) -> Option<Vec<Mutation>> {
        let Gem::Coin { holder } = gem else {
            return None;
        };
        let mut mutations = vec![Mutation::Remove(gem_id)];
        if let Some(agent) = holder {
            mutations.push(Mutation::Reward {
                agent: *agent,
                amount: self.reward,
            });
        }
        Some(mutations)
    }
}
