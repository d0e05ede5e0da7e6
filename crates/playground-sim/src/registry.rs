//! Named presets for elements and agents.
//!
//! A preset is a TOML table. Scene entries name a preset with `type` and
//! override any of its top-level keys; the merged table is then deserialised
//! into the typed config. Every base element kind is registered under its own
//! name, so `type = "edible"` works with no preset at all.

use std::collections::BTreeMap;

use playground_core::ConfigError;
use toml::{Table, Value};
use tracing::debug;

use crate::agent::{Agent, AgentConfig};
use crate::elements::{Element, ElementConfig, Resolver};

const TYPE_KEY: &str = "type";

/// Element kinds understood by [`ElementConfig`].
pub const ELEMENT_KINDS: [&str; 16] = [
    "basic",
    "absorbable",
    "terminal_contact",
    "edible",
    "reward_zone",
    "terminal_zone",
    "switch",
    "timer_switch",
    "door",
    "dispenser",
    "teleporter",
    "key",
    "coin",
    "lock",
    "chest",
    "vending_machine",
];

const DEFAULT_PRESETS: &str = r#"
[elements.apple]
type = "edible"
contour = { shape = "circle", radius = 10.0 }
mass = 5.0
interaction_range = 5.0
reward = 30.0
shrink_ratio = 0.9
min_reward = 5.0

[elements.rotten_apple]
type = "edible"
contour = { shape = "circle", radius = 10.0 }
mass = 5.0
interaction_range = 5.0
reward = -30.0
shrink_ratio = 0.9
min_reward = -5.0

[elements.candy]
type = "absorbable"
contour = { shape = "circle", radius = 4.0 }
reward = 5.0

[elements.poison]
type = "absorbable"
contour = { shape = "circle", radius = 4.0 }
reward = -5.0

[elements.goal_zone]
type = "terminal_zone"
contour = { shape = "square", width = 30.0 }
traversable = true
reward = 100.0

[elements.death_zone]
type = "terminal_zone"
contour = { shape = "square", width = 30.0 }
traversable = true
reward = -100.0

[elements.wall]
type = "basic"
contour = { shape = "rectangle", width = 10.0, length = 100.0 }

[agents.base]
sensors = [{ kind = "pose" }]

[agents.base.base]
name = "base"
contour = { shape = "circle", radius = 10.0 }
mass = 10.0
interaction_range = 5.0
actuators = [
    { name = "forward", kind = "linear_force", max_force = 100.0 },
    { name = "lateral", kind = "linear_force", axis = "lateral", max_force = 100.0 },
    { name = "rotation", kind = "angular_velocity", max_angular_velocity = 2.0 },
    { name = "activate", kind = "activate" },
    { name = "eat", kind = "eat" },
]

[agents.head]
sensors = [{ kind = "pose" }]

[agents.head.base]
name = "base"
contour = { shape = "circle", radius = 10.0 }
mass = 10.0
interaction_range = 5.0
actuators = [
    { name = "forward", kind = "linear_force", max_force = 100.0 },
    { name = "rotation", kind = "angular_velocity", max_angular_velocity = 2.0 },
    { name = "activate", kind = "activate" },
    { name = "eat", kind = "eat" },
]

[[agents.head.parts]]
name = "head"
anchor = "base"
contour = { shape = "circle", radius = 5.0 }
mass = 1.0
rotation_range = 3.0
max_angular_velocity = 2.0
actuators = [{ name = "head", kind = "joint_motor" }]

[agents.arm]
sensors = [{ kind = "pose" }]

[agents.arm.base]
name = "base"
contour = { shape = "circle", radius = 10.0 }
mass = 10.0
interaction_range = 5.0
actuators = [
    { name = "forward", kind = "linear_force", max_force = 100.0 },
    { name = "rotation", kind = "angular_velocity", max_angular_velocity = 2.0 },
    { name = "activate", kind = "activate" },
]

[[agents.arm.parts]]
name = "arm_left"
anchor = "base"
contour = { shape = "rectangle", width = 4.0, length = 20.0 }
mass = 1.0
pivot_on_anchor = [0.0, 10.0]
pivot_on_part = [-10.0, 0.0]
angle_offset = 1.5
rotation_range = 3.0
max_angular_velocity = 2.0
grasp_range = 5.0
actuators = [
    { name = "arm_left", kind = "joint_motor" },
    { name = "grasp_left", kind = "grasp" },
]

[[agents.arm.parts]]
name = "arm_right"
anchor = "base"
contour = { shape = "rectangle", width = 4.0, length = 20.0 }
mass = 1.0
pivot_on_anchor = [0.0, -10.0]
pivot_on_part = [-10.0, 0.0]
angle_offset = -1.5
rotation_range = 3.0
max_angular_velocity = 2.0
grasp_range = 5.0
actuators = [
    { name = "arm_right", kind = "joint_motor" },
    { name = "grasp_right", kind = "grasp" },
]
"#;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Preset tables keyed by type name. Owned by whoever loads scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    elements: BTreeMap<String, Table>,
    agents: BTreeMap<String, Table>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Base element kinds only; no agent presets.
    #[must_use]
    pub fn new() -> Self {
        let elements = ELEMENT_KINDS
            .iter()
            .map(|kind| {
                let mut preset = Table::new();
                preset.insert(TYPE_KEY.into(), Value::String((*kind).into()));
                ((*kind).to_owned(), preset)
            })
            .collect();
        Self {
            elements,
            agents: BTreeMap::new(),
        }
    }

    /// Base kinds plus the stock presets: `apple`, `rotten_apple`, `candy`,
    /// `poison`, `goal_zone`, `death_zone`, `wall`, and the `base`, `head`
    /// and `arm` agents.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.extend_from_toml(DEFAULT_PRESETS)?;
        Ok(registry)
    }

    /// Register every `[elements.*]` and `[agents.*]` table of a document.
    pub fn extend_from_toml(&mut self, content: &str) -> Result<(), ConfigError> {
        let mut doc: Table = toml::from_str(content)?;
        for (section, agent) in [("elements", false), ("agents", true)] {
            let Some(entries) = doc.remove(section) else {
                continue;
            };
            let Value::Table(entries) = entries else {
                return Err(ConfigError::invalid(section, "must be a table of presets"));
            };
            for (name, preset) in entries {
                let Value::Table(preset) = preset else {
                    return Err(ConfigError::invalid(
                        format!("{section}.{name}"),
                        "preset must be a table",
                    ));
                };
                if agent {
                    self.register_agent(name, preset);
                } else {
                    self.register_element(name, preset)?;
                }
            }
        }
        Ok(())
    }

    /// Register or replace an element preset. Its `type` must name a base kind.
    pub fn register_element(
        &mut self,
        name: impl Into<String>,
        preset: Table,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        let kind = type_name(&preset, "element")?;
        if !ELEMENT_KINDS.contains(&kind) {
            return Err(ConfigError::UnknownType {
                category: "element",
                name: kind.to_owned(),
            });
        }
        debug!(preset = %name, kind, "register element preset");
        self.elements.insert(name, preset);
        Ok(())
    }

    /// Register or replace an agent preset.
    pub fn register_agent(&mut self, name: impl Into<String>, preset: Table) {
        let name = name.into();
        debug!(preset = %name, "register agent preset");
        self.agents.insert(name, preset);
    }

    pub fn element_types(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn agent_types(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    // -- Resolution --

    /// Merge a scene entry over the preset it names.
    pub fn element_config(&self, entry: &Table) -> Result<ElementConfig, ConfigError> {
        let name = type_name(entry, "element")?;
        let preset = self.elements.get(name).ok_or_else(|| ConfigError::UnknownType {
            category: "element",
            name: name.to_owned(),
        })?;
        let mut merged = merge(preset, entry);
        if let Some(kind) = preset.get(TYPE_KEY) {
            merged.insert(TYPE_KEY.into(), kind.clone());
        }
        Ok(Value::Table(merged).try_into()?)
    }

    pub fn agent_config(&self, entry: &Table) -> Result<AgentConfig, ConfigError> {
        let name = type_name(entry, "agent")?;
        let preset = self.agents.get(name).ok_or_else(|| ConfigError::UnknownType {
            category: "agent",
            name: name.to_owned(),
        })?;
        let mut merged = merge(preset, entry);
        merged.remove(TYPE_KEY);
        Ok(Value::Table(merged).try_into()?)
    }

    pub fn element(&self, entry: &Table, resolver: &Resolver<'_>) -> Result<Element, ConfigError> {
        self.element_config(entry)?.build(resolver)
    }

    pub fn agent(&self, entry: &Table) -> Result<Agent, ConfigError> {
        self.agent_config(entry)?.build()
    }
}

fn type_name<'a>(table: &'a Table, category: &'static str) -> Result<&'a str, ConfigError> {
    match table.get(TYPE_KEY) {
        Some(Value::String(name)) => Ok(name),
        Some(_) => Err(ConfigError::invalid(TYPE_KEY, format!("{category} type must be a string"))),
        None => Err(ConfigError::MissingField(format!("{category} {TYPE_KEY}"))),
    }
}

/// Shallow merge: every key of `entry` replaces the preset's.
fn merge(preset: &Table, entry: &Table) -> Table {
    let mut merged = preset.clone();
    for (key, value) in entry {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
