//! Switches, doors, dispensers and teleporters.

use playground_core::{ConfigError, CountDownTimer};
use tracing::{debug, warn};

use super::config::ElementConfig;
use super::{Activable, ActivationContext};
use crate::ids::ElementId;
use crate::interaction::{ActivationCommand, Trigger};
use crate::mutation::{Destination, DoorAction, Mutation, Origin, Spawn};
use crate::sampler::CoordinateSampler;

// ---------------------------------------------------------------------------
// Doors and switches
// ---------------------------------------------------------------------------

/// A barrier whose shapes leave the simulation while open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    initially_open: bool,
    open: bool,
}

impl Door {
    #[must_use]
    pub const fn new(initially_open: bool) -> Self {
        Self {
            initially_open,
            open: initially_open,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Apply an action; returns the new open state.
    pub const fn apply(&mut self, action: DoorAction) -> bool {
        self.open = match action {
            DoorAction::Open => true,
            DoorAction::Close => false,
            DoorAction::Toggle => !self.open,
        };
        self.open
    }

    pub const fn reset(&mut self) {
        self.open = self.initially_open;
    }
}

/// Toggles a door each time it is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCloseSwitch {
    door: ElementId,
    trigger: Trigger,
}

impl OpenCloseSwitch {
    #[must_use]
    pub const fn new(door: ElementId) -> Self {
        Self {
            door,
            trigger: Trigger::Touch,
        }
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub const fn door(&self) -> ElementId {
        self.door
    }
}

impl Activable for OpenCloseSwitch {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn activate(&mut self, _ctx: &ActivationContext) -> Vec<Mutation> {
        vec![Mutation::Door {
            door: self.door,
            action: DoorAction::Toggle,
        }]
    }
}

/// Opens a door, then closes it again after a countdown.
/// Activating while the countdown runs restarts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSwitch {
    door: ElementId,
    timer: CountDownTimer,
    trigger: Trigger,
}

impl TimerSwitch {
    pub fn new(door: ElementId, duration: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            door,
            timer: CountDownTimer::new(duration)?,
            trigger: Trigger::Touch,
        })
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub const fn running(&self) -> bool {
        self.timer.running()
    }

    pub(crate) fn tick(&mut self) -> Vec<Mutation> {
        self.timer.step();
        if self.timer.tic() {
            vec![Mutation::Door {
                door: self.door,
                action: DoorAction::Close,
            }]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn reset(&mut self) {
        self.timer.reset();
    }
}

impl Activable for TimerSwitch {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn activate(&mut self, _ctx: &ActivationContext) -> Vec<Mutation> {
        self.timer.reset();
        self.timer.start();
        vec![Mutation::Door {
            door: self.door,
            action: DoorAction::Open,
        }]
    }
}

// ---------------------------------------------------------------------------
// Dispenser
// ---------------------------------------------------------------------------

/// Produces new temporary elements on activation, up to a per-episode limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispenser {
    template: Box<ElementConfig>,
    area: Option<CoordinateSampler>,
    spread: f32,
    production_limit: usize,
    produced: usize,
    trigger: Trigger,
}

impl Dispenser {
    /// The template is built once here so a broken one fails at load time.
    pub fn new(template: ElementConfig, production_limit: usize) -> Result<Self, ConfigError> {
        template.build(&|_| None)?;
        Ok(Self {
            template: Box::new(template),
            area: None,
            spread: 30.0,
            production_limit,
            produced: 0,
            trigger: Trigger::Command(ActivationCommand::Activate),
        })
    }

    /// Drop products here instead of around the dispenser.
    #[must_use]
    pub fn with_area(mut self, area: CoordinateSampler) -> Self {
        self.area = Some(area);
        self
    }

    /// Radius around the dispenser used when no area is set.
    pub fn with_spread(mut self, spread: f32) -> Result<Self, ConfigError> {
        if !(spread.is_finite() && spread > 0.0) {
            return Err(ConfigError::invalid("spread", "must be finite and > 0"));
        }
        self.spread = spread;
        Ok(self)
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub const fn produced(&self) -> usize {
        self.produced
    }

    #[must_use]
    pub const fn production_limit(&self) -> usize {
        self.production_limit
    }

    /// Called once a product is actually in the playground.
    pub(crate) const fn record_production(&mut self) {
        self.produced += 1;
    }

    pub(crate) const fn reset(&mut self) {
        self.produced = 0;
    }
}

impl Activable for Dispenser {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn activate(&mut self, ctx: &ActivationContext) -> Vec<Mutation> {
        if self.produced >= self.production_limit {
            debug!(dispenser = ?ctx.id, "production limit reached");
            return Vec::new();
        }
        let mut element = match self.template.build(&|_| None) {
            Ok(e) => e,
            Err(err) => {
                warn!(dispenser = ?ctx.id, %err, "cannot build product");
                return Vec::new();
            }
        };
        element.core.flags.temporary = true;
        let spawn = match &self.area {
            Some(area) => Spawn::Sample(area.clone()),
            None => match CoordinateSampler::circle(ctx.coordinates.position, self.spread) {
                Ok(area) => Spawn::Sample(area),
                Err(_) => Spawn::At(ctx.coordinates),
            },
        };
        vec![Mutation::Add {
            element: Box::new(element),
            spawn,
            origin: Origin::Dispenser(ctx.id),
        }]
    }
}

// ---------------------------------------------------------------------------
// Teleporter
// ---------------------------------------------------------------------------

/// Moves an agent that touches it to a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Teleporter {
    destination: Destination,
    trigger: Trigger,
}

impl Teleporter {
    #[must_use]
    pub const fn new(destination: Destination) -> Self {
        Self {
            destination,
            trigger: Trigger::Touch,
        }
    }

    #[must_use]
    pub const fn destination(&self) -> Destination {
        self.destination
    }

    pub const fn set_destination(&mut self, destination: Destination) {
        self.destination = destination;
    }
}

impl Activable for Teleporter {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn activate(&mut self, ctx: &ActivationContext) -> Vec<Mutation> {
        match ctx.by.agent() {
            Some(agent) => vec![Mutation::Teleport {
                agent,
                destination: self.destination,
            }],
            None => Vec::new(),
        }
    }
}
