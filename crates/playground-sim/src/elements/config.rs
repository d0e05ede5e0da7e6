//! Typed per-kind configuration for scene elements.

use playground_core::{ConfigError, ContourConfig, Coordinates, CoordinatesConfig};
use serde::{Deserialize, Serialize};

use super::{
    Absorbable, Chest, Coin, Dispenser, Door, Edible, Element, ElementKind, Key, Lock,
    OpenCloseSwitch, RewardZone, Teleporter, TerminalContact, TerminalZone, TimerSwitch,
    VendingMachine,
};
use crate::entity::{EntityConfig, EntityCore};
use crate::ids::ElementId;
use crate::interaction::{ActivationCommand, Trigger};
use crate::mutation::Destination;
use crate::sampler::CoordinateSampler;

/// Resolves element names declared earlier in a scene.
pub type Resolver<'a> = dyn Fn(&str) -> Option<ElementId> + 'a;

const fn default_shrink_ratio() -> f32 {
    0.9
}

const fn default_min_reward() -> f32 {
    1.0
}

const fn default_production_limit() -> usize {
    15
}

const fn default_spread() -> f32 {
    30.0
}

const fn eat() -> Trigger {
    Trigger::Command(ActivationCommand::Eat)
}

const fn activate() -> Trigger {
    Trigger::Command(ActivationCommand::Activate)
}

fn resolve(resolver: &Resolver<'_>, field: &str, name: &str) -> Result<ElementId, ConfigError> {
    resolver(name).ok_or_else(|| {
        ConfigError::invalid(field, format!("unknown element `{name}` (declare it earlier)"))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub reward: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardZoneConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub reward: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reward: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdibleConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub reward: f32,
    #[serde(default = "default_shrink_ratio")]
    pub shrink_ratio: f32,
    #[serde(default = "default_min_reward")]
    pub min_reward: f32,
    #[serde(default = "eat")]
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub door: String,
    #[serde(default)]
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSwitchConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub door: String,
    pub duration: u64,
    #[serde(default)]
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenserConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub produces: Box<ElementConfig>,
    #[serde(default = "default_production_limit")]
    pub production_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<CoordinateSampler>,
    #[serde(default = "default_spread")]
    pub spread: f32,
    #[serde(default = "activate")]
    pub trigger: Trigger,
}

/// `target` names another element; `target_coordinates` is a fixed pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleporterConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_coordinates: Option<CoordinatesConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub key_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub key_id: String,
    pub door: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub key_id: String,
    pub treasure: Box<ElementConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendingMachineConfig {
    #[serde(flatten)]
    pub entity: EntityConfig,
    pub reward: f32,
}

/// One scene element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementConfig {
    Basic(EntityConfig),
    Absorbable(RewardConfig),
    TerminalContact(RewardConfig),
    Edible(EdibleConfig),
    RewardZone(RewardZoneConfig),
    TerminalZone(RewardConfig),
    Switch(SwitchConfig),
    TimerSwitch(TimerSwitchConfig),
    Door(DoorConfig),
    Dispenser(DispenserConfig),
    Teleporter(TeleporterConfig),
    Key(KeyConfig),
    Coin(CoinConfig),
    Lock(LockConfig),
    Chest(ChestConfig),
    VendingMachine(VendingMachineConfig),
}

impl ElementConfig {
    #[must_use]
    pub fn basic(contour: ContourConfig) -> Self {
        Self::Basic(EntityConfig::new(contour))
    }

    #[must_use]
    pub const fn entity(&self) -> &EntityConfig {
        match self {
            Self::Basic(e) => e,
            Self::Absorbable(c) | Self::TerminalContact(c) | Self::TerminalZone(c) => &c.entity,
            Self::Edible(c) => &c.entity,
            Self::RewardZone(c) => &c.entity,
            Self::Switch(c) => &c.entity,
            Self::TimerSwitch(c) => &c.entity,
            Self::Door(c) => &c.entity,
            Self::Dispenser(c) => &c.entity,
            Self::Teleporter(c) => &c.entity,
            Self::Key(c) => &c.entity,
            Self::Coin(c) => &c.entity,
            Self::Lock(c) => &c.entity,
            Self::Chest(c) => &c.entity,
            Self::VendingMachine(c) => &c.entity,
        }
    }

    pub const fn entity_mut(&mut self) -> &mut EntityConfig {
        match self {
            Self::Basic(e) => e,
            Self::Absorbable(c) | Self::TerminalContact(c) | Self::TerminalZone(c) => {
                &mut c.entity
            }
            Self::Edible(c) => &mut c.entity,
            Self::RewardZone(c) => &mut c.entity,
            Self::Switch(c) => &mut c.entity,
            Self::TimerSwitch(c) => &mut c.entity,
            Self::Door(c) => &mut c.entity,
            Self::Dispenser(c) => &mut c.entity,
            Self::Teleporter(c) => &mut c.entity,
            Self::Key(c) => &mut c.entity,
            Self::Coin(c) => &mut c.entity,
            Self::Lock(c) => &mut c.entity,
            Self::Chest(c) => &mut c.entity,
            Self::VendingMachine(c) => &mut c.entity,
        }
    }

    /// Build the element. Names of other elements go through `resolver`.
    ///
    /// A teleporter whose `target` is not resolvable yet gets a placeholder
    /// destination; the scene loader links it once every element exists.
    pub fn build(&self, resolver: &Resolver<'_>) -> Result<Element, ConfigError> {
        let core = EntityCore::from_config(self.entity())?;
        let kind = match self {
            Self::Basic(_) => ElementKind::Basic,
            Self::Absorbable(c) => ElementKind::Absorbable(Absorbable::new(c.reward)),
            Self::TerminalContact(c) => ElementKind::TerminalContact(TerminalContact::new(c.reward)),
            Self::TerminalZone(c) => ElementKind::TerminalZone(TerminalZone::new(c.reward)?),
            Self::Edible(c) => ElementKind::Edible(
                Edible::new(c.reward, c.shrink_ratio, c.min_reward)?.with_trigger(c.trigger),
            ),
            Self::RewardZone(c) => ElementKind::RewardZone(RewardZone::new(c.reward, c.total_reward)?),
            Self::Switch(c) => ElementKind::Switch(
                OpenCloseSwitch::new(resolve(resolver, "door", &c.door)?).with_trigger(c.trigger),
            ),
            Self::TimerSwitch(c) => ElementKind::TimerSwitch(
                TimerSwitch::new(resolve(resolver, "door", &c.door)?, c.duration)?
                    .with_trigger(c.trigger),
            ),
            Self::Door(c) => ElementKind::Door(Door::new(c.open)),
            Self::Dispenser(c) => {
                let mut d = Dispenser::new((*c.produces).clone(), c.production_limit)?
                    .with_spread(c.spread)?
                    .with_trigger(c.trigger);
                if let Some(area) = &c.area {
                    area.validate()?;
                    d = d.with_area(area.clone());
                }
                ElementKind::Dispenser(d)
            }
            Self::Teleporter(c) => {
                let destination = match (&c.target, &c.target_coordinates) {
                    (Some(name), None) => resolver(name).map_or(
                        Destination::Coordinates(Coordinates::default()),
                        Destination::Element,
                    ),
                    (None, Some(coords)) => Destination::Coordinates((*coords).into()),
                    _ => {
                        return Err(ConfigError::invalid(
                            "target",
                            "set exactly one of target, target_coordinates",
                        ));
                    }
                };
                ElementKind::Teleporter(Teleporter::new(destination))
            }
            Self::Key(c) => ElementKind::Key(Key::new(c.key_id.clone())),
            Self::Coin(_) => ElementKind::Coin(Coin::new()),
            Self::Lock(c) => {
                ElementKind::Lock(Lock::new(c.key_id.clone(), resolve(resolver, "door", &c.door)?))
            }
            Self::Chest(c) => {
                c.treasure.build(&|_| None)?;
                ElementKind::Chest(Chest::new(c.key_id.clone(), (*c.treasure).clone()))
            }
            Self::VendingMachine(c) => ElementKind::VendingMachine(VendingMachine::new(c.reward)),
        };
        Ok(Element::new(core, kind))
    }
}
