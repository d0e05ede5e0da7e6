//! All rapier pipeline state for one playground instance.

use playground_core::{PlaygroundConfig, Vec2};
use rapier2d::prelude::{
    CCDSolver, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    Real, RigidBodySet, Vector, vector,
};

use crate::hooks::SameGroupFilter;

// ---------------------------------------------------------------------------
// CollisionPair
// ---------------------------------------------------------------------------

/// Two colliders touching after a sub-step, ordered by collider index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub first: ColliderHandle,
    pub second: ColliderHandle,
}

impl CollisionPair {
    #[must_use]
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        if a.into_raw_parts() <= b.into_raw_parts() {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// `(index, generation)` of both colliders.
    fn key(&self) -> ((u32, u32), (u32, u32)) {
        (self.first.into_raw_parts(), self.second.into_raw_parts())
    }

    #[must_use]
    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.first == handle || self.second == handle
    }
}

impl Ord for CollisionPair {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for CollisionPair {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// PhysicsContext
// ---------------------------------------------------------------------------

/// All rapier state in one place.
///
/// `PhysicsPipeline::step()` needs mutable access to every set at once, so
/// they live together. The context is rebuilt from scratch on playground
/// reset so no solver state leaks between episodes.
pub struct PhysicsContext {
    // -- Rapier sets --
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,

    // -- Pipeline objects --
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub ccd_solver: CCDSolver,

    // -- Parameters --
    pub integration_parameters: IntegrationParameters,
    pub gravity: Vector<Real>,
    /// Physics sub-steps per tick.
    pub substeps: usize,
    pub linear_damping: f32,
    pub angular_damping: f32,

    hooks: SameGroupFilter,
}

impl PhysicsContext {
    /// Create a context with given gravity, sub-step length and sub-step count.
    pub fn new(gravity: Vec2, dt: f32, substeps: usize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            integration_parameters,
            gravity: vector![gravity.x, gravity.y],
            substeps,
            linear_damping: 0.0,
            angular_damping: 0.0,
            hooks: SameGroupFilter,
        }
    }

    pub fn from_config(config: &PlaygroundConfig) -> Self {
        let mut context = Self::new(
            Vec2::new(config.gravity[0], config.gravity[1]),
            config.substep_dt(),
            config.substeps,
        );
        context.linear_damping = config.linear_damping;
        context.angular_damping = config.angular_damping;
        context
    }

    /// Run one sub-step and return the colliders touching afterwards.
    ///
    /// Solid pairs count when they have an active contact, sensor pairs when
    /// they intersect. The list is sorted so dispatch order does not depend
    /// on rapier's internal hash iteration.
    pub fn substep(&mut self) -> Vec<CollisionPair> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &self.hooks,
            &(),
        );
        self.touching_pairs()
    }

    /// Colliders currently touching, sorted and deduplicated.
    pub fn touching_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<CollisionPair> = self
            .narrow_phase
            .contact_pairs()
            .filter(|p| p.has_any_active_contact)
            .map(|p| CollisionPair::new(p.collider1, p.collider2))
            .chain(
                self.narrow_phase
                    .intersection_pairs()
                    .filter(|(_, _, intersecting)| *intersecting)
                    .map(|(a, b, _)| CollisionPair::new(a, b)),
            )
            .filter(|p| self.both_enabled(p))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    fn both_enabled(&self, pair: &CollisionPair) -> bool {
        let enabled = |h| self.collider_set.get(h).is_some_and(|c| c.is_enabled());
        enabled(pair.first) && enabled(pair.second)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
