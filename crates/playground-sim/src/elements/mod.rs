//! Scene elements: one struct with a tagged kind, and the behaviour traits
//! the interaction handlers call.

mod activable;
mod config;
mod edible;
mod gem;
mod reward;

pub use activable::{Dispenser, Door, OpenCloseSwitch, Teleporter, TimerSwitch};
pub use config::{
    ChestConfig, CoinConfig, DispenserConfig, DoorConfig, EdibleConfig, ElementConfig,
    KeyConfig, LockConfig, Resolver, RewardConfig, RewardZoneConfig, SwitchConfig,
    TeleporterConfig, TimerSwitchConfig, VendingMachineConfig,
};
pub use edible::Edible;
pub use gem::{Chest, Coin, Gem, Key, Lock, VendingMachine};
pub use reward::{Absorbable, RewardBudget, RewardZone, TerminalContact, TerminalZone};

use playground_core::{ConfigError, Coordinates, Teams};

use crate::entity::{EntityCore, EntityFlags, Placement};
use crate::ids::{AgentId, ElementId};
use crate::interaction::{Category, Trigger};
use crate::mutation::Mutation;

// ---------------------------------------------------------------------------
// Behaviour traits
// ---------------------------------------------------------------------------

/// Who set an element off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activator {
    Agent(AgentId),
    Element(ElementId),
    Timer,
}

impl Activator {
    #[must_use]
    pub const fn agent(&self) -> Option<AgentId> {
        match self {
            Self::Agent(a) => Some(*a),
            _ => None,
        }
    }
}

/// What an activation handler knows about the moment it fires.
#[derive(Debug, Clone, Copy)]
pub struct ActivationContext {
    pub id: ElementId,
    pub by: Activator,
    pub coordinates: Coordinates,
}

/// Elements that react to being set off. Effects are returned, never applied.
pub trait Activable {
    fn trigger(&self) -> Trigger;
    fn activate(&mut self, ctx: &ActivationContext) -> Vec<Mutation>;
}

/// Elements that hand out reward on contact, at most once per tick.
pub trait Rewarding {
    /// Reward for this tick, or `None` once already provided.
    fn provide(&mut self) -> Option<f32>;
    /// Whether contact ends the episode.
    fn terminal(&self) -> bool {
        false
    }
    /// Clear the once-per-tick flag.
    fn new_tick(&mut self);
    /// Restore the episode budget.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Obstacle or wall.
    Basic,
    Absorbable(Absorbable),
    TerminalContact(TerminalContact),
    Edible(Edible),
    RewardZone(RewardZone),
    TerminalZone(TerminalZone),
    Switch(OpenCloseSwitch),
    TimerSwitch(TimerSwitch),
    Door(Door),
    Dispenser(Dispenser),
    Teleporter(Teleporter),
    Key(Key),
    Coin(Coin),
    Lock(Lock),
    Chest(Chest),
    VendingMachine(VendingMachine),
}

impl ElementKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Absorbable(_) => "absorbable",
            Self::TerminalContact(_) => "terminal_contact",
            Self::Edible(_) => "edible",
            Self::RewardZone(_) => "reward_zone",
            Self::TerminalZone(_) => "terminal_zone",
            Self::Switch(_) => "switch",
            Self::TimerSwitch(_) => "timer_switch",
            Self::Door(_) => "door",
            Self::Dispenser(_) => "dispenser",
            Self::Teleporter(_) => "teleporter",
            Self::Key(_) => "key",
            Self::Coin(_) => "coin",
            Self::Lock(_) => "lock",
            Self::Chest(_) => "chest",
            Self::VendingMachine(_) => "vending_machine",
        }
    }
}

/// A scene object that is not part of an agent.
#[derive(Debug, Clone)]
pub struct Element {
    pub core: EntityCore,
    pub kind: ElementKind,
    fired: bool,
}

impl Element {
    pub fn new(core: EntityCore, mut kind: ElementKind) -> Self {
        if let ElementKind::Edible(e) = &mut kind {
            e.remember_shape(&core);
        }
        Self {
            core,
            kind,
            fired: false,
        }
    }

    // -- Builders --

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.core.placement = Placement::Fixed(coordinates);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.core.placement = placement;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Result<Self, ConfigError> {
        self.core.set_mass(mass)?;
        if let ElementKind::Edible(e) = &mut self.kind {
            e.remember_shape(&self.core);
        }
        Ok(self)
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.core.flags = flags;
        self
    }

    #[must_use]
    pub fn with_teams(mut self, teams: Teams) -> Self {
        self.core.teams = teams;
        self
    }

    pub fn with_interaction_range(mut self, range: f32) -> Result<Self, ConfigError> {
        self.core.set_interaction_range(range)?;
        Ok(self)
    }

    // -- Queries --

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    /// Category of this element's shapes.
    #[must_use]
    pub const fn category(&self) -> Category {
        match &self.kind {
            ElementKind::Absorbable(_) | ElementKind::TerminalContact(_) => Category::Contact,
            ElementKind::Edible(_)
            | ElementKind::Switch(_)
            | ElementKind::TimerSwitch(_)
            | ElementKind::Dispenser(_)
            | ElementKind::Teleporter(_) => Category::Activable,
            ElementKind::RewardZone(_) | ElementKind::TerminalZone(_) => Category::Zone,
            ElementKind::Key(_) | ElementKind::Coin(_) => Category::Gem,
            ElementKind::Lock(_) | ElementKind::Chest(_) | ElementKind::VendingMachine(_) => {
                Category::ActivableByGem
            }
            ElementKind::Basic | ElementKind::Door(_) => {
                if self.core.flags.trigger {
                    Category::Trigger
                } else {
                    Category::None
                }
            }
        }
    }

    pub fn as_activable(&mut self) -> Option<&mut dyn Activable> {
        match &mut self.kind {
            ElementKind::Edible(e) => Some(e),
            ElementKind::Switch(s) => Some(s),
            ElementKind::TimerSwitch(s) => Some(s),
            ElementKind::Dispenser(d) => Some(d),
            ElementKind::Teleporter(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_rewarding(&mut self) -> Option<&mut dyn Rewarding> {
        match &mut self.kind {
            ElementKind::Absorbable(r) => Some(r),
            ElementKind::TerminalContact(r) => Some(r),
            ElementKind::RewardZone(r) => Some(r),
            ElementKind::TerminalZone(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> Option<Trigger> {
        match &self.kind {
            ElementKind::Edible(e) => Some(e.trigger()),
            ElementKind::Switch(s) => Some(s.trigger()),
            ElementKind::TimerSwitch(s) => Some(s.trigger()),
            ElementKind::Dispenser(d) => Some(d.trigger()),
            ElementKind::Teleporter(t) => Some(t.trigger()),
            _ => None,
        }
    }

    /// The gem this element carries, if any.
    #[must_use]
    pub fn gem(&self) -> Option<Gem<'_>> {
        match &self.kind {
            ElementKind::Key(k) => Some(Gem::Key(k.key_id())),
            ElementKind::Coin(c) => Some(Gem::Coin {
                holder: c.last_holder(),
            }),
            _ => None,
        }
    }

    // -- Activation --

    /// Fire once per tick. `None` if already fired or not activable.
    pub fn activate(&mut self, ctx: &ActivationContext) -> Option<Vec<Mutation>> {
        if self.fired {
            return None;
        }
        let mutations = self.as_activable()?.activate(ctx);
        self.fired = true;
        Some(mutations)
    }

    /// Offer a gem to a gem-activated element. Mismatches are ignored and do
    /// not consume the tick.
    pub fn accept_gem(
        &mut self,
        ctx: &ActivationContext,
        gem_id: ElementId,
        gem: &Gem<'_>,
    ) -> Option<Vec<Mutation>> {
        if self.fired {
            return None;
        }
        let mutations = match &mut self.kind {
            ElementKind::Lock(l) => l.accept(ctx, gem_id, gem),
            ElementKind::Chest(c) => c.accept(ctx, gem_id, gem),
            ElementKind::VendingMachine(v) => v.accept(ctx, gem_id, gem),
            _ => None,
        }?;
        self.fired = true;
        Some(mutations)
    }

    // -- Lifecycle --

    /// Start of tick. Clears per-tick flags and advances internal timers.
    pub fn pre_step(&mut self) -> Vec<Mutation> {
        self.fired = false;
        if let Some(r) = self.as_rewarding() {
            r.new_tick();
        }
        match &mut self.kind {
            ElementKind::TimerSwitch(s) => s.tick(),
            _ => Vec::new(),
        }
    }

    /// Restore per-episode state. Geometry of shrunk edibles comes back too.
    pub fn reset(&mut self) {
        self.fired = false;
        if let Some(r) = self.as_rewarding() {
            r.reset();
        }
        match &mut self.kind {
            ElementKind::Edible(e) => e.restore(&mut self.core),
            ElementKind::TimerSwitch(s) => s.reset(),
            ElementKind::Door(d) => d.reset(),
            ElementKind::Dispenser(d) => d.reset(),
            ElementKind::Coin(c) => c.reset(),
            _ => {}
        }
        if let ElementKind::Door(d) = &self.kind {
            self.core.visible = !d.is_open();
        }
        self.core.needs_sprite_update = true;
    }
}
