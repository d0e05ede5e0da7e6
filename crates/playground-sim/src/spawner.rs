//! Random producers of temporary elements.

use playground_core::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::elements::ElementConfig;
use crate::ids::ElementId;
use crate::mutation::{Mutation, Origin, Spawn};
use crate::sampler::CoordinateSampler;

/// Each tick, with `probability`, adds one element from `template` inside
/// `area`.
///
/// `production_limit` caps the total over an episode and is restored only by
/// a playground reset. `max_elements` caps how many products may be alive at
/// once.
#[derive(Debug, Clone)]
pub struct Spawner {
    template: ElementConfig,
    area: CoordinateSampler,
    probability: f32,
    production_limit: Option<usize>,
    max_elements: Option<usize>,
    produced: usize,
    live: Vec<ElementId>,
}

impl Spawner {
    pub fn new(
        template: ElementConfig,
        area: CoordinateSampler,
        probability: f32,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::invalid("probability", "must be in [0, 1]"));
        }
        area.validate()?;
        template.build(&|_| None)?;
        Ok(Self {
            template,
            area,
            probability,
            production_limit: None,
            max_elements: None,
            produced: 0,
            live: Vec::new(),
        })
    }

    #[must_use]
    pub const fn with_production_limit(mut self, limit: usize) -> Self {
        self.production_limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = Some(max);
        self
    }

    #[must_use]
    pub const fn produced(&self) -> usize {
        self.produced
    }

    /// Products still alive, as of the last tick.
    #[must_use]
    pub fn live(&self) -> &[ElementId] {
        &self.live
    }

    /// Decide whether to produce this tick. `alive` tells which earlier
    /// products are still in the playground.
    pub(crate) fn tick<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
        alive: impl Fn(ElementId) -> bool,
    ) -> Option<Mutation> {
        self.live.retain(|id| alive(*id));
        if self.production_limit.is_some_and(|l| self.produced >= l)
            || self.max_elements.is_some_and(|m| self.live.len() >= m)
        {
            return None;
        }
        if rng.r#gen::<f32>() >= self.probability {
            return None;
        }
        let mut element = match self.template.build(&|_| None) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(spawner = index, %err, "cannot build element");
                return None;
            }
        };
        element.core.flags.temporary = true;
        Some(Mutation::Add {
            element: Box::new(element),
            spawn: Spawn::Sample(self.area.clone()),
            origin: Origin::Spawner(index),
        })
    }

    pub(crate) fn record(&mut self, id: ElementId) {
        self.produced += 1;
        self.live.push(id);
    }

    pub(crate) fn reset(&mut self) {
        self.produced = 0;
        self.live.clear();
    }
}

const fn default_probability() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub produces: ElementConfig,
    pub area: CoordinateSampler,
    #[serde(default = "default_probability")]
    pub probability: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
}

impl SpawnerConfig {
    pub fn build(&self) -> Result<Spawner, ConfigError> {
        let mut s = Spawner::new(self.produces.clone(), self.area.clone(), self.probability)?;
        s.production_limit = self.production_limit;
        s.max_elements = self.max_elements;
        Ok(s)
    }
}
