//! The engine: owns the physics world and every entity, and runs the
//! step/reset loop.
//!
//! One tick:
//!
//! 1. commands are validated and committed (explicit, else the controller),
//!    then perturbed by actuator noise;
//! 2. elements run `pre_step`, trajectories advance, idle grasps release;
//! 3. actuator values become forces, velocities and motor targets;
//! 4. the physics runs its sub-steps, and after each one the touching
//!    collider pairs go to the category handlers;
//! 5. timers and spawners tick;
//! 6. queued mutations are applied in order;
//! 7. rewards are collected, the episode advances, sensors read the result.

use std::collections::{BTreeMap, HashMap, HashSet};

use playground_actuator::prelude::{ActuatorKind, CommandMap, Controller, ForceAxis};
use playground_core::types::rotate;
use playground_core::{
    ConfigError, Contour, Coordinates, InvariantError, PlacementError, PlaygroundConfig,
    PlaygroundError, SeedHierarchy, Timer, Vec2,
};
use playground_physics::prelude::{
    BodyKind, ColliderHandle, ColliderSpec, CollisionPair, PhysicsContext, RigidBodyHandle,
};
use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;
use tracing::{debug, info, trace, warn};

use crate::agent::{Agent, GraspHold};
use crate::elements::{ActivationContext, Activator, Element, ElementKind};
use crate::entity::{EntityCore, LifeState, Placement};
use crate::episode::{Episode, EpisodeState};
use crate::ids::{AgentId, ElementId, Owner};
use crate::interaction::{
    Category, Handler, ShapeRole, ShapeTag, Toucher, TouchLedger, Trigger, handler_for,
};
use crate::mutation::{Destination, DoorAction, Mutation, MutationQueue, Origin, Spawn};
use crate::sensor::SpaceView;
use crate::spawner::Spawner;
use crate::stats::EpisodeStats;

/// Per-agent commands for one tick. Agents left out fall back to their
/// controller, or stay at their defaults.
pub type Commands = BTreeMap<AgentId, CommandMap>;

// ---------------------------------------------------------------------------
// Step output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// One reading per sensor, in sensor order, for every attached agent.
    pub observations: BTreeMap<AgentId, Vec<Vec<f32>>>,
    /// Reward collected by each agent during the tick.
    pub rewards: BTreeMap<AgentId, f32>,
    /// A termination flag was raised.
    pub done: bool,
    /// The time limit was reached.
    pub truncated: bool,
}

/// What a renderer needs to draw one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub owner: Owner,
    pub coordinates: Coordinates,
    pub contour: Contour,
    pub visible: bool,
    pub needs_sprite_update: bool,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Named {
    Element(ElementId),
    Agent(AgentId),
}

/// How the colliders of one body are tagged.
#[derive(Debug, Clone, Copy)]
struct ShapePlan {
    owner: Owner,
    category: Category,
    group: u128,
    grasp_range: f32,
    enabled: bool,
}

/// Build the body of `core` at `at` with its outline and halos, and register
/// every collider.
fn build_body(
    physics: &mut PhysicsContext,
    shapes: &mut HashMap<ColliderHandle, ShapeTag>,
    core: &mut EntityCore,
    plan: ShapePlan,
    at: Coordinates,
) -> Result<RigidBodyHandle, ConfigError> {
    let body = physics.add_body(core.body_kind(), at);
    let tag = |role, category| ShapeTag {
        owner: plan.owner,
        role,
        category,
    };

    let mut outline = if core.flags.traversable {
        ColliderSpec::sensor(core.contour.clone())
    } else {
        ColliderSpec::solid(core.contour.clone())
    };
    if let Some(mass) = core.mass {
        outline = outline.with_mass(mass);
    }
    let mut specs = vec![(outline, tag(ShapeRole::Visible, plan.category))];
    if core.interaction_range > 0.0 && plan.category != Category::None {
        specs.push((
            ColliderSpec::sensor(core.contour.inflated(core.interaction_range)),
            tag(ShapeRole::Interactive, plan.category),
        ));
    }
    if plan.grasp_range > 0.0 {
        specs.push((
            ColliderSpec::sensor(core.contour.inflated(plan.grasp_range)),
            tag(ShapeRole::Grasp, Category::Grasp),
        ));
    }

    for (spec, tag) in specs {
        let spec = spec.with_group(plan.group).with_enabled(plan.enabled);
        match physics.add_collider(body, &spec) {
            Ok(handle) => {
                shapes.insert(handle, tag);
            }
            Err(err) => {
                unregister_body(physics, shapes, body);
                return Err(err);
            }
        }
    }
    core.body = Some(body);
    core.state = LifeState::Attached;
    Ok(body)
}

fn unregister_body(
    physics: &mut PhysicsContext,
    shapes: &mut HashMap<ColliderHandle, ShapeTag>,
    body: RigidBodyHandle,
) {
    for collider in physics.body_colliders(body) {
        shapes.remove(&collider);
    }
    physics.remove_body(body);
}

/// Drop the body of `core`, with its colliders and joints.
fn release_body(
    physics: &mut PhysicsContext,
    shapes: &mut HashMap<ColliderHandle, ShapeTag>,
    core: &mut EntityCore,
) {
    if let Some(body) = core.body.take() {
        unregister_body(physics, shapes, body);
    }
}

/// Whether every solid part of `agent` is free when its base is at `base`.
fn agent_fits(
    physics: &PhysicsContext,
    agent: &Agent,
    base: Coordinates,
) -> Result<bool, ConfigError> {
    let own = agent.body_handles();
    for (part, at) in agent.parts().iter().zip(agent.layout(base)) {
        if !part.core.flags.traversable && physics.overlaps(part.core.contour(), at, &own)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Draws initial coordinates, retrying sampled placements until `fits`.
struct Placer<'a> {
    physics: &'a PhysicsContext,
    rng: &'a mut ChaCha8Rng,
    attempts: usize,
}

impl Placer<'_> {
    fn find(
        &mut self,
        placement: &mut Placement,
        fits: impl Fn(&PhysicsContext, Coordinates) -> Result<bool, ConfigError>,
    ) -> Result<Coordinates, PlaygroundError> {
        let sampled = placement.is_sampled();
        let attempts = if sampled { self.attempts.max(1) } else { 1 };
        let mut last = Coordinates::default();
        for attempt in 0..attempts {
            let at = placement.initial(self.rng);
            if fits(self.physics, at)? {
                if attempt > 0 {
                    debug!(attempt, "placement found after retries");
                }
                return Ok(at);
            }
            last = at;
        }
        Err(if sampled {
            PlacementError::AttemptsExhausted { attempts }.into()
        } else {
            PlacementError::Overlap {
                x: last.position.x,
                y: last.position.y,
            }
            .into()
        })
    }
}

fn describe<K: slotmap::Key>(name: Option<&str>, id: K) -> String {
    name.map_or_else(|| format!("{id:?}"), |n| format!("`{n}`"))
}

// ---------------------------------------------------------------------------
// Playground
// ---------------------------------------------------------------------------

/// A walled 2D space with elements, agents and the step/reset loop.
///
/// Instances share nothing and can be moved across threads.
pub struct Playground {
    config: PlaygroundConfig,
    seeds: SeedHierarchy,
    rng: ChaCha8Rng,
    physics: PhysicsContext,

    elements: SlotMap<ElementId, Element>,
    agents: SlotMap<AgentId, Agent>,
    shapes: HashMap<ColliderHandle, ShapeTag>,
    names: HashMap<String, Named>,
    destroyed_elements: HashSet<ElementId>,
    destroyed_agents: HashSet<AgentId>,
    walls: Vec<(RigidBodyHandle, Contour)>,

    spawners: Vec<Spawner>,
    timers: Vec<(Timer, ElementId)>,
    queue: MutationQueue,
    touches: TouchLedger,

    episode: Episode,
    stats: EpisodeStats,
    next_group: u128,
    terminated: bool,
}

impl Playground {
    pub fn new(config: PlaygroundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = SeedHierarchy::new(config.seed);
        let mut playground = Self {
            rng: seeds.episode_rng(0, 0),
            physics: PhysicsContext::from_config(&config),
            seeds,
            config,
            elements: SlotMap::with_key(),
            agents: SlotMap::with_key(),
            shapes: HashMap::new(),
            names: HashMap::new(),
            destroyed_elements: HashSet::new(),
            destroyed_agents: HashSet::new(),
            walls: Vec::new(),
            spawners: Vec::new(),
            timers: Vec::new(),
            queue: MutationQueue::default(),
            touches: TouchLedger::default(),
            episode: Episode::default(),
            stats: EpisodeStats::new(),
            next_group: 0,
            terminated: false,
        };
        playground.build_walls()?;
        info!(
            size = ?playground.config.size,
            seed = playground.config.seed,
            "playground created"
        );
        Ok(playground)
    }

    fn build_walls(&mut self) -> Result<(), ConfigError> {
        if !self.config.walls {
            return Ok(());
        }
        let [w, h] = self.config.size;
        let t = self.config.wall_thickness;
        let horizontal = Contour::rectangle(t, w + 2.0 * t)?;
        let vertical = Contour::rectangle(h + 2.0 * t, t)?;
        let walls = [
            (horizontal.clone(), Coordinates::at(w / 2.0, -t / 2.0)),
            (horizontal, Coordinates::at(w / 2.0, h + t / 2.0)),
            (vertical.clone(), Coordinates::at(-t / 2.0, h / 2.0)),
            (vertical, Coordinates::at(w + t / 2.0, h / 2.0)),
        ];
        for (contour, at) in walls {
            let body = self.physics.add_body(BodyKind::Fixed, at);
            let collider = self
                .physics
                .add_collider(body, &ColliderSpec::solid(contour.clone()))?;
            self.shapes.insert(
                collider,
                ShapeTag {
                    owner: Owner::Wall,
                    role: ShapeRole::Visible,
                    category: Category::None,
                },
            );
            self.walls.push((body, contour));
        }
        Ok(())
    }

    fn placer(&mut self) -> Placer<'_> {
        Placer {
            physics: &self.physics,
            rng: &mut self.rng,
            attempts: self.config.placement_attempts,
        }
    }

    fn check_name(&self, name: Option<&str>) -> Result<(), InvariantError> {
        match name {
            Some(n) if self.names.contains_key(n) => Err(InvariantError::DuplicateName(n.into())),
            _ => Ok(()),
        }
    }

    // -- Lookups --

    fn live_element(&self, id: ElementId) -> Result<&Element, InvariantError> {
        if self.destroyed_elements.contains(&id) {
            return Err(InvariantError::Destroyed(format!("{id:?}")));
        }
        let element = self
            .elements
            .get(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        if element.core.is_attached() {
            Ok(element)
        } else {
            Err(InvariantError::Removed(describe(element.name(), id)))
        }
    }

    fn live_agent(&self, id: AgentId) -> Result<&Agent, InvariantError> {
        if self.destroyed_agents.contains(&id) {
            return Err(InvariantError::Destroyed(format!("{id:?}")));
        }
        let agent = self
            .agents
            .get(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        if agent.is_attached() {
            Ok(agent)
        } else {
            Err(InvariantError::Removed(describe(agent.name.as_deref(), id)))
        }
    }

    fn tag(&self, collider: ColliderHandle) -> Result<ShapeTag, InvariantError> {
        self.shapes
            .get(&collider)
            .copied()
            .ok_or_else(|| InvariantError::UnregisteredShape(collider.into_raw_parts().0))
    }

    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// Add an element at its initial placement, refusing overlaps.
    pub fn add(&mut self, element: Element) -> Result<ElementId, PlaygroundError> {
        self.add_with(element, false)
    }

    /// Add an element. Sampled placements are retried up to
    /// `placement_attempts` times before giving up.
    pub fn add_with(
        &mut self,
        mut element: Element,
        allow_overlapping: bool,
    ) -> Result<ElementId, PlaygroundError> {
        self.check_name(element.name())?;
        let solid = !element.core.flags.traversable;
        let EntityCore {
            placement, contour, ..
        } = &mut element.core;
        let contour = &*contour;
        let at = self.placer().find(placement, |physics, at| {
            Ok(allow_overlapping || !solid || !physics.overlaps(contour, at, &[])?)
        })?;
        self.insert_element(element, at)
    }

    fn insert_element(
        &mut self,
        element: Element,
        at: Coordinates,
    ) -> Result<ElementId, PlaygroundError> {
        self.check_name(element.name())?;
        let name = element.name().map(str::to_owned);
        let kind = element.kind.name();
        let id = self.elements.insert(element);
        if let Err(err) = self.attach_element(id, at) {
            self.elements.remove(id);
            return Err(err.into());
        }
        if let Some(name) = name {
            self.names.insert(name, Named::Element(id));
        }
        debug!(?id, kind, x = at.position.x, y = at.position.y, "element added");
        Ok(id)
    }

    fn attach_element(&mut self, id: ElementId, at: Coordinates) -> Result<(), ConfigError> {
        let Some(element) = self.elements.get_mut(id) else {
            return Ok(());
        };
        let enabled = match &element.kind {
            ElementKind::Door(door) => !door.is_open(),
            _ => true,
        };
        let plan = ShapePlan {
            owner: Owner::Element(id),
            category: element.category(),
            group: 0,
            grasp_range: 0.0,
            enabled,
        };
        build_body(&mut self.physics, &mut self.shapes, &mut element.core, plan, at)?;
        element.core.set_visible(enabled);
        Ok(())
    }

    /// Take an element out of the space. Temporary elements are destroyed;
    /// others come back on reset. Removing twice is a no-op.
    pub fn remove(&mut self, id: ElementId) -> Result<(), PlaygroundError> {
        if self.destroyed_elements.contains(&id) {
            return Ok(());
        }
        let element = self
            .elements
            .get(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        if !element.core.is_attached() {
            return Ok(());
        }
        if element.core.flags.temporary {
            self.destroy_element(id);
            return Ok(());
        }
        self.release_grasps_on(id);
        if let Some(element) = self.elements.get_mut(id) {
            release_body(&mut self.physics, &mut self.shapes, &mut element.core);
            element.core.state = LifeState::Removed;
            debug!(?id, kind = element.kind.name(), "element removed");
        }
        Ok(())
    }

    fn destroy_element(&mut self, id: ElementId) {
        self.release_grasps_on(id);
        if let Some(mut element) = self.elements.remove(id) {
            release_body(&mut self.physics, &mut self.shapes, &mut element.core);
            if let Some(name) = element.name() {
                self.names.remove(name);
            }
            self.destroyed_elements.insert(id);
            debug!(?id, kind = element.kind.name(), "element destroyed");
        }
    }

    /// Teleport an element with zero velocity.
    pub fn move_element(
        &mut self,
        id: ElementId,
        at: Coordinates,
        allow_overlapping: bool,
    ) -> Result<(), PlaygroundError> {
        let element = self.live_element(id)?;
        let Some(body) = element.core.body() else {
            return Err(InvariantError::Removed(describe(element.name(), id)).into());
        };
        if !allow_overlapping
            && !element.core.flags.traversable
            && self.physics.overlaps(element.core.contour(), at, &[body])?
        {
            return Err(PlacementError::Overlap {
                x: at.position.x,
                y: at.position.y,
            }
            .into());
        }
        self.release_grasps_on(id);
        self.physics.set_pose(body, at);
        self.physics.set_velocity(body, Vec2::zeros(), 0.0);
        Ok(())
    }

    pub fn set_element_velocity(
        &mut self,
        id: ElementId,
        linear: Vec2,
        angular: f32,
    ) -> Result<(), PlaygroundError> {
        let element = self.live_element(id)?;
        if let Some(body) = element.core.body() {
            self.physics.set_velocity(body, linear, angular);
        }
        Ok(())
    }

    /// Fire an activable element now and apply what it produces.
    /// Returns whether it fired. Any reward it credits is reported by the
    /// next [`step`](Self::step).
    pub fn activate(&mut self, id: ElementId, by: Activator) -> Result<bool, PlaygroundError> {
        self.live_element(id)?;
        let fired = self.fire(id, by);
        self.apply_mutations();
        Ok(fired)
    }

    /// Point a teleporter somewhere else.
    pub fn set_teleport_destination(
        &mut self,
        id: ElementId,
        destination: Destination,
    ) -> Result<(), PlaygroundError> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        match &mut element.kind {
            ElementKind::Teleporter(t) => {
                t.set_destination(destination);
                Ok(())
            }
            other => Err(ConfigError::invalid(
                "destination",
                format!("{} is not a teleporter", other.name()),
            )
            .into()),
        }
    }

    /// Activate `target` on every tic of `timer`.
    pub fn add_timer(&mut self, timer: Timer, target: ElementId) -> Result<(), PlaygroundError> {
        let element = self
            .elements
            .get(target)
            .ok_or_else(|| InvariantError::UnknownId(format!("{target:?}")))?;
        if element.trigger().is_none() {
            return Err(ConfigError::invalid(
                "target",
                format!("{} cannot be activated", element.kind.name()),
            )
            .into());
        }
        self.timers.push((timer, target));
        Ok(())
    }

    /// Returns the spawner's index.
    pub fn add_spawner(&mut self, spawner: Spawner) -> usize {
        self.spawners.push(spawner);
        self.spawners.len() - 1
    }

    // -----------------------------------------------------------------------
    // Agents
    // -----------------------------------------------------------------------

    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId, PlaygroundError> {
        self.add_agent_with(agent, false)
    }

    pub fn add_agent_with(
        &mut self,
        mut agent: Agent,
        allow_overlapping: bool,
    ) -> Result<AgentId, PlaygroundError> {
        self.check_name(agent.name.as_deref())?;
        let mut placement = std::mem::take(&mut agent.placement);
        let found = self.placer().find(&mut placement, |physics, at| {
            Ok(allow_overlapping || agent_fits(physics, &agent, at)?)
        });
        agent.placement = placement;
        let at = found?;

        self.next_group += 1;
        agent.group = self.next_group;
        let name = agent.name.clone();
        let id = self.agents.insert(agent);
        if let Err(err) = self.attach_agent(id, at) {
            self.agents.remove(id);
            return Err(err.into());
        }
        if let Some(name) = name {
            self.names.insert(name, Named::Agent(id));
        }
        debug!(?id, x = at.position.x, y = at.position.y, "agent added");
        Ok(id)
    }

    /// Build every part at its forward-placed pose, then join each part to
    /// its anchor.
    fn attach_agent(&mut self, id: AgentId, base: Coordinates) -> Result<(), ConfigError> {
        let Some(agent) = self.agents.get_mut(id) else {
            return Ok(());
        };
        let poses = agent.layout(base);
        let group = agent.group;
        let mut bodies = Vec::with_capacity(poses.len());
        let mut failure = None;
        for (index, (part, at)) in agent.parts_mut().iter_mut().zip(poses).enumerate() {
            let plan = ShapePlan {
                owner: Owner::Part(id, index),
                category: Category::Agent,
                group,
                grasp_range: part.grasp_range,
                enabled: true,
            };
            match build_body(&mut self.physics, &mut self.shapes, &mut part.core, plan, at) {
                Ok(body) => bodies.push(body),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = failure {
            for part in agent.parts_mut() {
                release_body(&mut self.physics, &mut self.shapes, &mut part.core);
                part.core.state = LifeState::Detached;
            }
            return Err(err);
        }
        for (part, body) in agent.parts_mut().iter_mut().zip(&bodies) {
            if let Some(mount) = part.mount().copied() {
                part.joint = Some(
                    self.physics
                        .add_pivot_joint(bodies[mount.anchor], *body, &mount.pivot),
                );
            }
        }
        agent.state = LifeState::Attached;
        Ok(())
    }

    /// Take an agent out of the space. Same rules as [`Playground::remove`].
    pub fn remove_agent(&mut self, id: AgentId) -> Result<(), PlaygroundError> {
        if self.destroyed_agents.contains(&id) {
            return Ok(());
        }
        let agent = self
            .agents
            .get(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        if !agent.is_attached() {
            return Ok(());
        }
        let temporary = agent.temporary;
        self.release_grasp(id);
        if temporary {
            self.destroy_agent(id);
        } else if let Some(agent) = self.agents.get_mut(id) {
            for part in agent.parts_mut() {
                release_body(&mut self.physics, &mut self.shapes, &mut part.core);
                part.core.state = LifeState::Removed;
                part.joint = None;
            }
            agent.state = LifeState::Removed;
            debug!(?id, "agent removed");
        }
        Ok(())
    }

    fn destroy_agent(&mut self, id: AgentId) {
        self.release_grasp(id);
        if let Some(mut agent) = self.agents.remove(id) {
            for part in agent.parts_mut() {
                release_body(&mut self.physics, &mut self.shapes, &mut part.core);
            }
            if let Some(name) = agent.name.as_deref() {
                self.names.remove(name);
            }
            self.destroyed_agents.insert(id);
            debug!(?id, "agent destroyed");
        }
    }

    /// Teleport an agent's base.
    ///
    /// With `keep_joints` every part is forward-placed from its anchor with
    /// the pivots at rest and all velocities zeroed. Otherwise only the base
    /// moves and the joint solver pulls the other parts back over the next
    /// sub-steps. Any grasp is released.
    pub fn move_agent(
        &mut self,
        id: AgentId,
        at: Coordinates,
        keep_joints: bool,
        allow_overlapping: bool,
    ) -> Result<(), PlaygroundError> {
        let agent = self.live_agent(id)?;
        if !allow_overlapping {
            let fits = if keep_joints {
                agent_fits(&self.physics, agent, at)?
            } else {
                let base = agent.base();
                base.core.flags.traversable
                    || !self
                        .physics
                        .overlaps(base.core.contour(), at, &agent.body_handles())?
            };
            if !fits {
                return Err(PlacementError::Overlap {
                    x: at.position.x,
                    y: at.position.y,
                }
                .into());
            }
        }
        let poses = agent.layout(at);
        let bodies: Vec<Option<RigidBodyHandle>> =
            agent.parts().iter().map(|p| p.core.body()).collect();
        self.release_grasp(id);
        for (index, (body, pose)) in bodies.into_iter().zip(poses).enumerate() {
            let Some(body) = body else { continue };
            if index == 0 || keep_joints {
                self.physics.set_pose(body, pose);
                self.physics.set_velocity(body, Vec2::zeros(), 0.0);
            }
        }
        Ok(())
    }

    pub fn set_controller(
        &mut self,
        id: AgentId,
        controller: Box<dyn Controller>,
    ) -> Result<(), PlaygroundError> {
        let agent = self
            .agents
            .get_mut(id)
            .ok_or_else(|| InvariantError::UnknownId(format!("{id:?}")))?;
        agent.set_controller(controller);
        Ok(())
    }

    fn release_grasp(&mut self, id: AgentId) {
        if let Some(hold) = self.agents.get_mut(id).and_then(|a| a.grasp.take()) {
            self.physics.remove_joints(&hold.joints);
            debug!(agent = ?id, element = ?hold.element, "grasp released");
        }
    }

    fn release_grasps_on(&mut self, element: ElementId) {
        for (id, agent) in &mut self.agents {
            if let Some(hold) = agent.grasp.take_if(|h| h.element == element) {
                self.physics.remove_joints(&hold.joints);
                debug!(agent = ?id, ?element, "grasp forced open");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Start a new episode.
    ///
    /// Temporary entities are destroyed, the physics world is rebuilt from
    /// scratch, the random stream is re-derived from the seed and the episode
    /// number, and every remaining entity is re-attached at its initial
    /// placement in insertion order.
    pub fn reset(&mut self) -> Result<StepResult, PlaygroundError> {
        self.destroy_temporaries();

        self.physics = PhysicsContext::from_config(&self.config);
        self.shapes.clear();
        self.walls.clear();
        self.build_walls()?;
        self.queue.clear();
        self.touches.clear();
        self.terminated = false;

        self.episode.reset(self.seeds.root());
        self.rng = self.seeds.episode_rng(0, self.episode.number);
        for spawner in &mut self.spawners {
            spawner.reset();
        }
        for (timer, _) in &mut self.timers {
            timer.reset();
        }

        let attempts = self.config.placement_attempts;
        let ids: Vec<ElementId> = self.elements.keys().collect();
        for id in ids {
            let Some(element) = self.elements.get_mut(id) else {
                continue;
            };
            element.reset();
            element.core.body = None;
            let solid = !element.core.flags.traversable;
            let EntityCore {
                placement, contour, ..
            } = &mut element.core;
            let contour = &*contour;
            let check = solid && placement.is_sampled();
            let mut placer = Placer {
                physics: &self.physics,
                rng: &mut self.rng,
                attempts,
            };
            let at = match placer.find(placement, |physics, at| {
                Ok(!check || !physics.overlaps(contour, at, &[])?)
            }) {
                Ok(at) => at,
                Err(err) => {
                    warn!(?id, %err, "no free spot; placing anyway");
                    placement.initial(&mut *placer.rng)
                }
            };
            self.attach_element(id, at)?;
        }

        let ids: Vec<AgentId> = self.agents.keys().collect();
        for id in ids {
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            agent.reward = 0.0;
            agent.pending_reward = 0.0;
            agent.episode_reward = 0.0;
            agent.grasp = None;
            agent.reset_commands();
            agent.reset_noise(&mut self.rng);
            agent.reset_controller();
            for part in agent.parts_mut() {
                part.core.body = None;
                part.joint = None;
            }
            let mut placement = std::mem::take(&mut agent.placement);
            let check = placement.is_sampled();
            let agent = &*agent;
            let mut placer = Placer {
                physics: &self.physics,
                rng: &mut self.rng,
                attempts,
            };
            let at = match placer.find(&mut placement, |physics, at| {
                Ok(!check || agent_fits(physics, agent, at)?)
            }) {
                Ok(at) => at,
                Err(err) => {
                    warn!(?id, %err, "no free spot for agent; placing anyway");
                    placement.initial(&mut *placer.rng)
                }
            };
            if let Some(agent) = self.agents.get_mut(id) {
                agent.placement = placement;
            }
            self.attach_agent(id, at)?;
        }

        info!(
            episode = self.episode.number,
            elements = self.elements.len(),
            agents = self.agents.len(),
            "reset"
        );
        Ok(StepResult {
            observations: self.observe(),
            rewards: self.agents.keys().map(|id| (id, 0.0)).collect(),
            done: false,
            truncated: false,
        })
    }

    /// Replace the root seed and restart episode numbering, then reset.
    /// Two playgrounds built the same way replay identically from here.
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<StepResult, PlaygroundError> {
        self.config.seed = seed;
        self.seeds = SeedHierarchy::new(seed);
        self.episode = Episode::default();
        self.reset()
    }

    fn destroy_temporaries(&mut self) {
        let elements: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, e)| e.core.flags.temporary)
            .map(|(id, _)| id)
            .collect();
        for id in elements {
            self.destroy_element(id);
        }
        let agents: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|(_, a)| a.temporary)
            .map(|(id, _)| id)
            .collect();
        for id in agents {
            self.destroy_agent(id);
        }
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    /// Advance one tick. The first call resets implicitly; stepping a
    /// finished episode is an error.
    pub fn step(&mut self, commands: &Commands) -> Result<StepResult, PlaygroundError> {
        match self.episode.state {
            EpisodeState::Idle => {
                self.reset()?;
            }
            state if state.is_terminal() => return Err(InvariantError::EpisodeOver.into()),
            _ => {}
        }
        self.apply_commands(commands)?;

        self.touches.begin_tick();
        self.pre_step();
        self.release_idle_grasps();
        self.apply_actuators();

        for _ in 0..self.config.substeps {
            let pairs = self.physics.substep();
            trace!(pairs = pairs.len(), "sub-step");
            for pair in pairs {
                self.dispatch(pair)?;
            }
        }

        self.tick_timers();
        self.tick_spawners();
        self.apply_mutations();
        Ok(self.finish_tick())
    }

    /// Every agent's commands are validated before any is committed, so a
    /// rejected step leaves actuators and the noise stream untouched.
    fn apply_commands(&mut self, commands: &Commands) -> Result<(), PlaygroundError> {
        for id in commands.keys() {
            self.live_agent(*id)?;
        }
        let mode = self.config.check_mode;
        let mut staged = Vec::with_capacity(self.agents.len());
        for (id, agent) in &mut self.agents {
            if !agent.is_attached() {
                staged.push((id, Vec::new()));
                continue;
            }
            let polled = if commands.contains_key(&id) {
                None
            } else {
                agent.poll_controller()
            };
            let batch = match commands.get(&id).or(polled.as_ref()) {
                Some(map) => agent.stage_commands(map, mode)?,
                None => Vec::new(),
            };
            staged.push((id, batch));
        }
        for (id, batch) in staged {
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            agent.reset_commands();
            if agent.is_attached() {
                agent.commit_commands(batch, mode)?;
                agent.apply_noise(&mut self.rng);
            }
        }
        Ok(())
    }

    fn pre_step(&mut self) {
        for (_, element) in &mut self.elements {
            if !element.core.is_attached() {
                continue;
            }
            self.queue.extend(element.pre_step());
            if let (Placement::Trajectory(trajectory), Some(body)) =
                (&mut element.core.placement, element.core.body)
            {
                self.physics.drive_kinematic(body, trajectory.next());
            }
        }
    }

    fn release_idle_grasps(&mut self) {
        for (id, agent) in &mut self.agents {
            let held = agent
                .grasp
                .as_ref()
                .is_some_and(|h| agent.grasping_with(h.part));
            if !held {
                if let Some(hold) = agent.grasp.take() {
                    self.physics.remove_joints(&hold.joints);
                    debug!(agent = ?id, element = ?hold.element, "grasp released");
                }
            }
        }
    }

    /// Turn committed actuator values into forces, velocities and motor
    /// targets. Held for every sub-step of the tick.
    fn apply_actuators(&mut self) {
        for (_, agent) in self.agents.iter().filter(|(_, a)| a.is_attached()) {
            let parts = agent.parts();
            for part in parts {
                let Some(body) = part.core.body() else {
                    continue;
                };
                self.physics.reset_forces(body);
                for actuator in part.actuators() {
                    let command = actuator.command();
                    match *actuator.kind() {
                        ActuatorKind::LinearForce { axis, max_force } => {
                            let Some(pose) = self.physics.pose(body) else {
                                continue;
                            };
                            let local = match axis {
                                ForceAxis::Forward => Vec2::new(1.0, 0.0),
                                ForceAxis::Lateral => Vec2::new(0.0, 1.0),
                            };
                            self.physics
                                .add_force(body, rotate(local, pose.angle) * command * max_force);
                        }
                        ActuatorKind::AngularVelocity {
                            max_angular_velocity,
                        } => {
                            self.physics
                                .set_angular_velocity(body, command * max_angular_velocity);
                        }
                        ActuatorKind::JointMotor => {
                            let (Some(mount), Some(joint)) = (part.mount(), part.joint()) else {
                                continue;
                            };
                            let Some(anchor) = parts[mount.anchor].core.body() else {
                                continue;
                            };
                            let relative = self.physics.relative_angle(anchor, body).unwrap_or(0.0);
                            self.physics
                                .set_motor_velocity(joint, part.motor_velocity(command, relative));
                        }
                        ActuatorKind::Grasp | ActuatorKind::Activate | ActuatorKind::Eat => {}
                    }
                }
            }
        }
    }

    fn tick_timers(&mut self) {
        let mut due = Vec::new();
        for (timer, target) in &mut self.timers {
            timer.step();
            if timer.tic() {
                due.push(*target);
            }
        }
        for target in due {
            self.fire(target, Activator::Timer);
        }
    }

    fn tick_spawners(&mut self) {
        let elements = &self.elements;
        for (index, spawner) in self.spawners.iter_mut().enumerate() {
            let alive = |id| elements.get(id).is_some_and(|e| e.core.is_attached());
            if let Some(mutation) = spawner.tick(index, &mut self.rng, alive) {
                self.queue.push(mutation);
            }
        }
    }

    fn finish_tick(&mut self) -> StepResult {
        let mut total = 0.0;
        let mut rewards = BTreeMap::new();
        for (id, agent) in &mut self.agents {
            let reward = agent.post_step();
            total += reward;
            rewards.insert(id, reward);
        }
        let ended = self
            .episode
            .close_tick(total, self.terminated, self.config.time_limit);
        if ended {
            self.stats.record(&self.episode);
            info!(
                episode = self.episode.number,
                ticks = self.episode.tick,
                reward = self.episode.total_reward,
                state = ?self.episode.state,
                "episode over"
            );
        }
        StepResult {
            observations: self.observe(),
            rewards,
            done: self.episode.state == EpisodeState::Done,
            truncated: self.episode.state == EpisodeState::Truncated,
        }
    }

    /// Sensors read the final state of the tick through a read-only view.
    fn observe(&mut self) -> BTreeMap<AgentId, Vec<Vec<f32>>> {
        let mut sensors: Vec<(AgentId, Vec<_>)> = self
            .agents
            .iter_mut()
            .filter(|(_, a)| a.is_attached())
            .map(|(id, a)| (id, std::mem::take(&mut a.sensors)))
            .collect();
        let view = SpaceView {
            physics: &self.physics,
            elements: &self.elements,
            agents: &self.agents,
            tick: self.episode.tick,
        };
        let observations = sensors
            .iter_mut()
            .map(|(id, list)| (*id, list.iter_mut().map(|s| s.update(&view, *id)).collect()))
            .collect();
        for (id, list) in sensors {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.sensors = list;
            }
        }
        observations
    }

    // -----------------------------------------------------------------------
    // Interaction dispatch
    // -----------------------------------------------------------------------

    fn teams_interact(&self, a: Owner, b: Owner) -> bool {
        let teams = |owner: Owner| match owner {
            Owner::Element(id) => self.elements.get(id).map(|e| &e.core.teams),
            Owner::Part(id, _) => self.agents.get(id).map(|a| &a.teams),
            Owner::Wall => None,
        };
        match (teams(a), teams(b)) {
            (Some(x), Some(y)) => x.interacts_with(y),
            _ => true,
        }
    }

    fn dispatch(&mut self, pair: CollisionPair) -> Result<(), InvariantError> {
        let (first, second) = (self.tag(pair.first)?, self.tag(pair.second)?);
        let Some((handler, swapped)) = handler_for(first.category, second.category) else {
            return Ok(());
        };
        let (a, b) = if swapped {
            (second, first)
        } else {
            (first, second)
        };
        if !self.teams_interact(a.owner, b.owner) {
            return Ok(());
        }
        match handler {
            Handler::AgentContact | Handler::AgentZone => {
                if let (Some(agent), Some(element)) = (a.owner.agent(), b.owner.element()) {
                    self.collect_reward(agent, element);
                }
            }
            Handler::AgentActivable => {
                if let (Some(agent), Some(element)) = (a.owner.agent(), b.owner.element()) {
                    self.agent_activates(agent, element);
                }
            }
            Handler::TriggerActivable => {
                if let (Some(trigger), Some(target)) = (a.owner.element(), b.owner.element()) {
                    self.touch_activates(trigger, target);
                }
            }
            Handler::ActivableActivable => {
                if let (Some(x), Some(y)) = (a.owner.element(), b.owner.element()) {
                    for (mover, target) in [(x, y), (y, x)] {
                        if self.elements.get(mover).is_some_and(|e| e.core.movable()) {
                            self.touch_activates(mover, target);
                        }
                    }
                }
            }
            Handler::GemActivable => {
                if let (Some(gem), Some(target)) = (a.owner.element(), b.owner.element()) {
                    self.offer_gem(gem, target);
                }
            }
            Handler::Grasp => {
                if let (Owner::Part(agent, part), Some(element)) = (a.owner, b.owner.element()) {
                    self.try_grasp(agent, part, element);
                }
            }
        }
        Ok(())
    }

    fn collect_reward(&mut self, agent: AgentId, id: ElementId) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        if !element.core.is_attached() {
            return;
        }
        let absorbed = matches!(element.kind, ElementKind::Absorbable(_));
        let Some(rewarding) = element.as_rewarding() else {
            return;
        };
        let Some(amount) = rewarding.provide() else {
            return;
        };
        trace!(?agent, element = ?id, amount, "reward");
        self.queue.push(Mutation::Reward { agent, amount });
        if rewarding.terminal() {
            self.queue.push(Mutation::Terminate);
        }
        if absorbed {
            self.queue.push(Mutation::Remove(id));
        }
    }

    fn agent_activates(&mut self, agent: AgentId, id: ElementId) {
        let Some(trigger) = self.elements.get(id).and_then(Element::trigger) else {
            return;
        };
        let edge = self.touches.touch(Toucher::Agent(agent), id);
        let fire = match trigger {
            Trigger::Touch => edge,
            Trigger::Command(command) => self
                .agents
                .get(agent)
                .is_some_and(|a| a.commanding(command)),
        };
        if fire {
            self.fire(id, Activator::Agent(agent));
        }
    }

    fn touch_activates(&mut self, toucher: ElementId, target: ElementId) {
        let touch = self.elements.get(target).and_then(Element::trigger) == Some(Trigger::Touch);
        if touch && self.touches.touch(Toucher::Element(toucher), target) {
            self.fire(target, Activator::Element(toucher));
        }
    }

    fn offer_gem(&mut self, gem_id: ElementId, target_id: ElementId) {
        let Some([gem, target]) = self.elements.get_disjoint_mut([gem_id, target_id]) else {
            return;
        };
        if !(gem.core.is_attached() && target.core.is_attached()) {
            return;
        }
        let (Some(offered), Some(body)) = (gem.gem(), target.core.body()) else {
            return;
        };
        let ctx = ActivationContext {
            id: target_id,
            by: Activator::Element(gem_id),
            coordinates: self.physics.pose(body).unwrap_or_default(),
        };
        if let Some(mutations) = target.accept_gem(&ctx, gem_id, &offered) {
            debug!(gem = ?gem_id, target = ?target_id, "gem accepted");
            self.queue.extend(mutations);
        }
    }

    fn try_grasp(&mut self, agent_id: AgentId, part: usize, id: ElementId) {
        let graspable = self.elements.get(id).is_some_and(|e| {
            e.core.flags.graspable && e.core.movable() && e.core.is_attached()
        });
        let ready = self
            .agents
            .get(agent_id)
            .is_some_and(|a| a.grasp.is_none() && a.grasping_with(part));
        if graspable && ready {
            self.queue.push(Mutation::Grasp {
                agent: agent_id,
                part,
                element: id,
            });
        }
    }

    /// Activate an element once for this tick. Returns whether it fired.
    fn fire(&mut self, id: ElementId, by: Activator) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        let Some(body) = element.core.body() else {
            return false;
        };
        let ctx = ActivationContext {
            id,
            by,
            coordinates: self.physics.pose(body).unwrap_or_default(),
        };
        match element.activate(&ctx) {
            Some(mutations) => {
                trace!(element = ?id, ?by, kind = element.kind.name(), "activated");
                self.queue.extend(mutations);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Apply everything queued this tick, in order. Failures are logged and
    /// skipped.
    fn apply_mutations(&mut self) {
        for mutation in self.queue.drain() {
            match mutation {
                Mutation::Remove(id) => {
                    if let Err(err) = self.remove(id) {
                        warn!(element = ?id, %err, "cannot remove");
                    }
                }
                Mutation::Add {
                    element,
                    spawn,
                    origin,
                } => self.spawn(*element, spawn, origin),
                Mutation::Door { door, action } => self.apply_door(door, action),
                Mutation::Shrink { element, factor } => {
                    if let Err(err) = self.shrink(element, factor) {
                        warn!(?element, %err, "cannot shrink");
                    }
                }
                Mutation::Teleport { agent, destination } => {
                    if let Err(err) = self.teleport(agent, destination) {
                        warn!(?agent, %err, "cannot teleport");
                    }
                }
                Mutation::Grasp {
                    agent,
                    part,
                    element,
                } => self.grasp(agent, part, element),
                Mutation::Reward { agent, amount } => {
                    if let Some(a) = self.agents.get_mut(agent) {
                        a.pending_reward += amount;
                    }
                }
                Mutation::Terminate => self.terminated = true,
            }
        }
    }

    fn spawn(&mut self, mut element: Element, spawn: Spawn, origin: Origin) {
        let (mut placement, check) = match spawn {
            Spawn::At(at) => (Placement::Fixed(at), false),
            Spawn::Sample(area) => (Placement::Sampler(area), !element.core.flags.traversable),
        };
        let contour = element.core.contour().clone();
        let found = self.placer().find(&mut placement, |physics, at| {
            Ok(!check || !physics.overlaps(&contour, at, &[])?)
        });
        let at = match found {
            Ok(at) => at,
            Err(err) => {
                warn!(?origin, %err, "cannot place new element");
                return;
            }
        };
        element.core.placement = Placement::Fixed(at);
        let id = match self.insert_element(element, at) {
            Ok(id) => id,
            Err(err) => {
                warn!(?origin, %err, "cannot add new element");
                return;
            }
        };
        match origin {
            Origin::Dispenser(dispenser) => {
                if let Some(ElementKind::Dispenser(d)) =
                    self.elements.get_mut(dispenser).map(|e| &mut e.kind)
                {
                    d.record_production();
                }
            }
            Origin::Spawner(index) => {
                if let Some(spawner) = self.spawners.get_mut(index) {
                    spawner.record(id);
                }
            }
            Origin::Chest(_) => {}
        }
    }

    fn apply_door(&mut self, id: ElementId, action: DoorAction) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        let ElementKind::Door(door) = &mut element.kind else {
            warn!(element = ?id, "door action on a non-door");
            return;
        };
        let open = door.apply(action);
        element.core.set_visible(!open);
        if let Some(body) = element.core.body() {
            self.physics.set_body_enabled(body, !open);
        }
        debug!(door = ?id, open, "door");
    }

    /// Scale an element in place and rebuild its body at the same pose.
    fn shrink(&mut self, id: ElementId, factor: f32) -> Result<(), ConfigError> {
        let Some(body) = self.elements.get(id).and_then(|e| e.core.body()) else {
            return Ok(());
        };
        let at = self.physics.pose(body).unwrap_or_default();
        self.release_grasps_on(id);
        if let Some(element) = self.elements.get_mut(id) {
            element.core.rescale(factor);
            release_body(&mut self.physics, &mut self.shapes, &mut element.core);
        }
        self.attach_element(id, at)
    }

    fn teleport(&mut self, agent: AgentId, destination: Destination) -> Result<(), PlaygroundError> {
        let at = match destination {
            Destination::Element(target) => {
                let element = self.live_element(target)?;
                element
                    .core
                    .body()
                    .and_then(|b| self.physics.pose(b))
                    .unwrap_or_default()
            }
            Destination::Coordinates(at) => at,
        };
        self.move_agent(agent, at, true, true)?;
        if let Destination::Element(target) = destination {
            self.touches.suppress(Toucher::Agent(agent), target);
        }
        debug!(?agent, ?destination, "teleported");
        Ok(())
    }

    fn grasp(&mut self, agent_id: AgentId, part: usize, id: ElementId) {
        let held_elsewhere = self
            .agents
            .values()
            .any(|a| a.grasp.as_ref().is_some_and(|h| h.element == id));
        let Some(agent) = self.agents.get(agent_id) else {
            return;
        };
        if held_elsewhere || agent.grasp.is_some() || !agent.is_attached() {
            return;
        }
        let Some(holder) = agent.parts().get(part).and_then(|p| p.core.body()) else {
            return;
        };
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        let Some(held) = element.core.body() else {
            return;
        };
        let radius = element.core.contour().bounding_radius() / 2.0;
        let joints = self.physics.add_grasp_bundle(holder, held, radius);
        if let ElementKind::Coin(coin) = &mut element.kind {
            coin.held_by(agent_id);
        }
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.grasp = Some(GraspHold {
                part,
                element: id,
                joints,
            });
        }
        debug!(agent = ?agent_id, element = ?id, "grasped");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    #[must_use]
    pub const fn episode(&self) -> &Episode {
        &self.episode
    }

    #[must_use]
    pub const fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    #[must_use]
    pub const fn physics(&self) -> &PhysicsContext {
        &self.physics
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter()
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    #[must_use]
    pub fn spawner(&self, index: usize) -> Option<&Spawner> {
        self.spawners.get(index)
    }

    /// Whether the id belonged to a temporary entity that is gone for good.
    #[must_use]
    pub fn is_destroyed(&self, id: ElementId) -> bool {
        self.destroyed_elements.contains(&id)
    }

    #[must_use]
    pub fn element_by_name(&self, name: &str) -> Option<ElementId> {
        match self.names.get(name) {
            Some(Named::Element(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn agent_by_name(&self, name: &str) -> Option<AgentId> {
        match self.names.get(name) {
            Some(Named::Agent(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn element_pose(&self, id: ElementId) -> Option<Coordinates> {
        self.physics.pose(self.elements.get(id)?.core.body()?)
    }

    /// Pose of the agent's base.
    #[must_use]
    pub fn agent_pose(&self, id: AgentId) -> Option<Coordinates> {
        self.physics.pose(self.agents.get(id)?.base().core.body()?)
    }

    #[must_use]
    pub fn part_pose(&self, id: AgentId, part: usize) -> Option<Coordinates> {
        self.physics
            .pose(self.agents.get(id)?.parts().get(part)?.core.body()?)
    }

    /// Every attached body with what a renderer needs.
    #[must_use]
    pub fn drawables(&self) -> Vec<Drawable> {
        let drawable = |owner: Owner, core: &EntityCore| -> Option<Drawable> {
            let coordinates = self.physics.pose(core.body()?)?;
            Some(Drawable {
                owner,
                coordinates,
                contour: core.contour().clone(),
                visible: core.visible(),
                needs_sprite_update: core.needs_sprite_update,
            })
        };
        let elements = self
            .elements
            .iter()
            .filter_map(|(id, e)| drawable(Owner::Element(id), &e.core));
        let parts = self.agents.iter().flat_map(|(id, a)| {
            a.parts()
                .iter()
                .enumerate()
                .filter_map(move |(i, p)| drawable(Owner::Part(id, i), &p.core))
        });
        let walls = self.walls.iter().filter_map(|(body, contour)| {
            Some(Drawable {
                owner: Owner::Wall,
                coordinates: self.physics.pose(*body)?,
                contour: contour.clone(),
                visible: true,
                needs_sprite_update: false,
            })
        });
        elements.chain(parts).chain(walls).collect()
    }

    /// Owners whose shape or visibility changed since the last call.
    pub fn take_sprite_updates(&mut self) -> Vec<Owner> {
        let mut updated = Vec::new();
        for (id, element) in &mut self.elements {
            if std::mem::take(&mut element.core.needs_sprite_update) {
                updated.push(Owner::Element(id));
            }
        }
        for (id, agent) in &mut self.agents {
            for (i, part) in agent.parts_mut().iter_mut().enumerate() {
                if std::mem::take(&mut part.core.needs_sprite_update) {
                    updated.push(Owner::Part(id, i));
                }
            }
        }
        updated
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
