//! Deferred changes to the space, queued during pair dispatch and applied
//! once the physics sub-steps are over.

use playground_core::Coordinates;

use crate::elements::Element;
use crate::ids::{AgentId, ElementId};
use crate::sampler::CoordinateSampler;

/// Where an added element goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    /// Exactly here, overlapping or not.
    At(Coordinates),
    /// Sampled with bounded retries until it does not overlap.
    Sample(CoordinateSampler),
}

/// Who asked for an added element. Used for production bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Dispenser(ElementId),
    Spawner(usize),
    Chest(ElementId),
}

/// Teleport target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination {
    /// Onto another element. The arrival does not count as a new touch.
    Element(ElementId),
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    Toggle,
}

#[derive(Debug, Clone)]
pub enum Mutation {
    Remove(ElementId),
    Add {
        element: Box<Element>,
        spawn: Spawn,
        origin: Origin,
    },
    Door {
        door: ElementId,
        action: DoorAction,
    },
    /// Scale an element's contour and rebuild its body.
    Shrink {
        element: ElementId,
        factor: f32,
    },
    Teleport {
        agent: AgentId,
        destination: Destination,
    },
    Grasp {
        agent: AgentId,
        part: usize,
        element: ElementId,
    },
    Reward {
        agent: AgentId,
        amount: f32,
    },
    Terminate,
}

/// FIFO of pending mutations for the current tick.
#[derive(Debug, Default)]
pub struct MutationQueue {
    pending: Vec<Mutation>,
}

impl MutationQueue {
    pub fn push(&mut self, mutation: Mutation) {
        self.pending.push(mutation);
    }

    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.pending.extend(mutations);
    }

    /// Take everything queued so far, in insertion order.
    pub fn drain(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
