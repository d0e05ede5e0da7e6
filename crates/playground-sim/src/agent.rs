//! Agents: a base part, jointed parts, actuators, sensors and an optional
//! controller.

use std::collections::BTreeSet;
use std::f32::consts::TAU;
use std::fmt;

use playground_actuator::prelude::{Actuator, ActuatorConfig, ActuatorKind, CommandMap, Controller};
use playground_core::{
    CheckMode, ConfigError, ContourConfig, Contour, Coordinates, InvariantError, PlaygroundError,
    Teams, Vec2,
};
use playground_physics::prelude::{ImpulseJointHandle, PivotSpec, RigidBodyHandle};
use serde::{Deserialize, Serialize};

use crate::entity::{LifeState, Placement, PlacementConfig};
use crate::ids::ElementId;
use crate::interaction::ActivationCommand;
use crate::part::{Mount, Part};
use crate::sensor::{Sensor, SensorConfig};

/// An element held by one of the agent's parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraspHold {
    pub part: usize,
    pub element: ElementId,
    pub(crate) joints: Vec<ImpulseJointHandle>,
}

/// A validated command, addressed by part and actuator index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StagedCommand {
    part: usize,
    index: usize,
    value: f32,
}

pub struct Agent {
    pub name: Option<String>,
    pub teams: Teams,
    parts: Vec<Part>,
    pub placement: Placement,
    pub temporary: bool,
    pub(crate) state: LifeState,
    pub(crate) reward: f32,
    /// Credited since the last tick closed; banked into `reward` by the next.
    pub(crate) pending_reward: f32,
    pub(crate) episode_reward: f32,
    pub(crate) grasp: Option<GraspHold>,
    pub(crate) group: u128,
    pub(crate) sensors: Vec<Box<dyn Sensor>>,
    controller: Option<Box<dyn Controller>>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("parts", &self.parts.len())
            .field("state", &self.state)
            .field("reward", &self.reward)
            .field("grasp", &self.grasp)
            .field("sensors", &self.sensors.len())
            .field("controller", &self.controller.is_some())
            .finish_non_exhaustive()
    }
}

impl Agent {
    #[must_use]
    pub fn new(base: Part) -> Self {
        Self {
            name: None,
            teams: Teams::none(),
            parts: vec![base],
            placement: Placement::default(),
            temporary: false,
            state: LifeState::Detached,
            reward: 0.0,
            pending_reward: 0.0,
            episode_reward: 0.0,
            grasp: None,
            group: 0,
            sensors: Vec::new(),
            controller: None,
        }
    }

    /// Append a mounted part. Anchors must already be present and names unique.
    pub fn add_part(&mut self, part: Part) -> Result<usize, ConfigError> {
        let Some(mount) = part.mount() else {
            return Err(ConfigError::invalid("anchor", "only the base may be unmounted"));
        };
        if mount.anchor >= self.parts.len() {
            return Err(ConfigError::invalid(
                "anchor",
                format!("part `{}` anchors to a part not yet added", part.name()),
            ));
        }
        if self.part_index(part.name()).is_some() {
            return Err(ConfigError::invalid(
                "name",
                format!("duplicate part `{}`", part.name()),
            ));
        }
        let mut names: BTreeSet<&str> = self.actuators().map(|(_, a)| a.name()).collect();
        if let Some(dup) = part.actuators().iter().find(|a| !names.insert(a.name())) {
            return Err(ConfigError::invalid(
                "actuators",
                format!("duplicate actuator `{}`", dup.name()),
            ));
        }
        self.parts.push(part);
        Ok(self.parts.len() - 1)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_teams(mut self, teams: Teams) -> Self {
        self.teams = teams;
        self
    }

    #[must_use]
    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.placement = Placement::Fixed(coordinates);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_sensor(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.sensors.push(sensor);
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn set_controller(&mut self, controller: Box<dyn Controller>) {
        self.controller = Some(controller);
    }

    // -- Queries --

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    #[must_use]
    pub fn base(&self) -> &Part {
        &self.parts[0]
    }

    #[must_use]
    pub fn part_index(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.name() == name)
    }

    #[must_use]
    pub const fn state(&self) -> LifeState {
        self.state
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        matches!(self.state, LifeState::Attached)
    }

    /// Reward of the last finished tick. Includes anything credited by
    /// [`Playground::activate`](crate::Playground::activate) before that tick.
    #[must_use]
    pub const fn reward(&self) -> f32 {
        self.reward
    }

    /// Reward accumulated since the last reset.
    #[must_use]
    pub const fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    #[must_use]
    pub const fn grasp(&self) -> Option<&GraspHold> {
        self.grasp.as_ref()
    }

    #[must_use]
    pub const fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    /// Every actuator with the index of the part carrying it.
    pub fn actuators(&self) -> impl Iterator<Item = (usize, &Actuator)> {
        self.parts
            .iter()
            .enumerate()
            .flat_map(|(i, p)| p.actuators().iter().map(move |a| (i, a)))
    }

    pub fn actuator(&self, name: &str) -> Option<&Actuator> {
        self.actuators().map(|(_, a)| a).find(|a| a.name() == name)
    }

    pub(crate) fn body_handles(&self) -> Vec<RigidBodyHandle> {
        self.parts.iter().filter_map(|p| p.core.body()).collect()
    }

    /// Whether any `activate`/`eat` actuator is on this tick.
    #[must_use]
    pub fn commanding(&self, command: ActivationCommand) -> bool {
        self.actuators().any(|(_, a)| {
            a.is_active()
                && matches!(
                    (command, a.kind()),
                    (ActivationCommand::Activate, ActuatorKind::Activate)
                        | (ActivationCommand::Eat, ActuatorKind::Eat)
                )
        })
    }

    /// Whether the grasp actuator on `part` is on this tick.
    #[must_use]
    pub fn grasping_with(&self, part: usize) -> bool {
        self.parts.get(part).is_some_and(|p| {
            p.actuators()
                .iter()
                .any(|a| matches!(a.kind(), ActuatorKind::Grasp) && a.is_active())
        })
    }

    /// Poses of every part when the base sits at `base` and every pivot is
    /// at rest.
    #[must_use]
    pub fn layout(&self, base: Coordinates) -> Vec<Coordinates> {
        let mut poses: Vec<Coordinates> = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let pose = part
                .mount()
                .and_then(|m| poses.get(m.anchor).copied())
                .and_then(|anchor| part.placed_from(anchor))
                .unwrap_or(base);
            poses.push(pose);
        }
        poses
    }

    // -- Commands --

    pub(crate) fn reset_commands(&mut self) {
        for part in &mut self.parts {
            for a in &mut part.actuators {
                a.reset_command();
            }
        }
    }

    /// Validate every command first, then commit them all.
    pub fn apply_commands(&mut self, commands: &CommandMap, mode: CheckMode) -> Result<(), PlaygroundError> {
        let staged = self.stage_commands(commands, mode)?;
        self.commit_commands(staged, mode)
    }

    /// Resolve and validate without touching any actuator.
    pub(crate) fn stage_commands(
        &self,
        commands: &CommandMap,
        mode: CheckMode,
    ) -> Result<Vec<StagedCommand>, PlaygroundError> {
        commands
            .iter()
            .map(|(name, value)| {
                let (part, index) = self
                    .locate_actuator(name)
                    .ok_or_else(|| InvariantError::UnknownId(format!("actuator `{name}`")))?;
                let value = self.parts[part].actuators[index].range().validate(*value, mode)?;
                Ok(StagedCommand { part, index, value })
            })
            .collect()
    }

    pub(crate) fn commit_commands(
        &mut self,
        staged: Vec<StagedCommand>,
        mode: CheckMode,
    ) -> Result<(), PlaygroundError> {
        for StagedCommand { part, index, value } in staged {
            self.parts[part].actuators[index].set_command(value, mode)?;
        }
        Ok(())
    }

    fn locate_actuator(&self, name: &str) -> Option<(usize, usize)> {
        self.parts.iter().enumerate().find_map(|(p, part)| {
            part.actuators()
                .iter()
                .position(|a| a.name() == name)
                .map(|i| (p, i))
        })
    }

    pub(crate) fn apply_noise<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        for part in &mut self.parts {
            for a in &mut part.actuators {
                a.apply_noise(rng);
            }
        }
    }

    pub(crate) fn reset_noise<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        for part in &mut self.parts {
            for a in &mut part.actuators {
                a.reset_noise(rng);
            }
        }
    }

    /// Ask the controller, if any, for this tick's commands.
    pub fn poll_controller(&mut self) -> Option<CommandMap> {
        let actuators: Vec<&Actuator> = self.parts.iter().flat_map(|p| p.actuators().iter()).collect();
        self.controller
            .as_mut()
            .map(|c| c.generate_commands(&actuators))
    }

    /// End of tick: bank the pending reward and return it.
    pub(crate) fn post_step(&mut self) -> f32 {
        self.reward = std::mem::take(&mut self.pending_reward);
        self.episode_reward += self.reward;
        self.reward
    }

    pub(crate) fn reset_controller(&mut self) {
        if let Some(c) = self.controller.as_mut() {
            c.reset();
        }
        for s in &mut self.sensors {
            s.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const fn default_rotation_range() -> f32 {
    TAU
}

const fn default_max_angular_velocity() -> f32 {
    1.0
}

const fn default_mass() -> f32 {
    10.0
}

/// One part. The first entry of an agent is its base and has no `anchor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    pub name: String,
    pub contour: ContourConfig,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default)]
    pub pivot_on_anchor: [f32; 2],
    #[serde(default)]
    pub pivot_on_part: [f32; 2],
    #[serde(default)]
    pub angle_offset: f32,
    #[serde(default = "default_rotation_range")]
    pub rotation_range: f32,
    #[serde(default = "default_max_angular_velocity")]
    pub max_angular_velocity: f32,
    #[serde(default)]
    pub actuators: Vec<ActuatorConfig>,
    #[serde(default)]
    pub grasp_range: f32,
    #[serde(default)]
    pub interaction_range: f32,
}

impl PartConfig {
    fn build(&self, anchor: Option<usize>) -> Result<Part, ConfigError> {
        let mut part = Part::new(self.name.clone(), Contour::from_config(&self.contour)?, self.mass)?
            .with_grasp_range(self.grasp_range)?
            .with_interaction_range(self.interaction_range)?;
        for a in &self.actuators {
            part = part.with_actuator(a.build()?);
        }
        if let Some(anchor) = anchor {
            part = part.mounted(Mount {
                anchor,
                pivot: PivotSpec {
                    pivot_on_anchor: Vec2::new(self.pivot_on_anchor[0], self.pivot_on_anchor[1]),
                    pivot_on_part: Vec2::new(self.pivot_on_part[0], self.pivot_on_part[1]),
                    angle_offset: self.angle_offset,
                    rotation_range: self.rotation_range,
                },
                max_angular_velocity: self.max_angular_velocity,
            })?;
        }
        Ok(part)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub teams: Teams,
    #[serde(default)]
    pub temporary: bool,
    #[serde(flatten)]
    pub placement: PlacementConfig,
    pub base: PartConfig,
    #[serde(default)]
    pub parts: Vec<PartConfig>,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

impl AgentConfig {
    pub fn build(&self) -> Result<Agent, ConfigError> {
        if self.base.anchor.is_some() {
            return Err(ConfigError::invalid("base.anchor", "the base has no anchor"));
        }
        let mut agent = Agent::new(self.base.build(None)?);
        for cfg in &self.parts {
            let anchor_name = cfg
                .anchor
                .as_deref()
                .ok_or_else(|| ConfigError::MissingField(format!("parts.{}.anchor", cfg.name)))?;
            let anchor = agent.part_index(anchor_name).ok_or_else(|| {
                ConfigError::invalid("anchor", format!("unknown part `{anchor_name}`"))
            })?;
            agent.add_part(cfg.build(Some(anchor))?)?;
        }
        agent.name.clone_from(&self.name);
        agent.teams = self.teams.clone();
        agent.temporary = self.temporary;
        agent.placement = self.placement.build()?;
        for s in &self.sensors {
            agent.sensors.push(s.build()?);
        }
        Ok(agent)
    }
}
