//! Rigid bodies and colliders built from contours.

use playground_core::{ConfigError, Contour, Coordinates, Vec2};
use rapier2d::parry::query;
use rapier2d::prelude::{
    ActiveCollisionTypes, ActiveHooks, Collider, ColliderBuilder, ColliderHandle, Isometry,
    Point, Real, RigidBodyBuilder, RigidBodyHandle, SharedShape, point, vector,
};
use tracing::trace;

use crate::context::PhysicsContext;

// ---------------------------------------------------------------------------
// BodyKind / ColliderSpec
// ---------------------------------------------------------------------------

/// How the solver treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Never moves; walls and non-movable elements.
    Fixed,
    /// Mass and inertia from its colliders.
    Dynamic,
    /// Driven pose-by-pose; trajectory followers.
    Kinematic,
}

/// Collider description independent of rapier builders.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderSpec {
    pub contour: Contour,
    /// Sensors report intersections and never push anything.
    pub sensor: bool,
    /// Total collider mass. `None` keeps rapier's unit density.
    pub mass: Option<f32>,
    /// Non-zero groups suppress contacts between colliders of the same group.
    pub group: u128,
    pub friction: f32,
    pub restitution: f32,
    pub enabled: bool,
}

impl ColliderSpec {
    #[must_use]
    pub const fn solid(contour: Contour) -> Self {
        Self {
            contour,
            sensor: false,
            mass: None,
            group: 0,
            friction: 0.5,
            restitution: 0.0,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn sensor(contour: Contour) -> Self {
        let mut spec = Self::solid(contour);
        spec.sensor = true;
        spec
    }

    #[must_use]
    pub const fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    #[must_use]
    pub const fn with_group(mut self, group: u128) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Convert a contour to a rapier shape.
pub fn shape_from_contour(contour: &Contour) -> Result<SharedShape, ConfigError> {
    match contour {
        Contour::Circle { radius } => Ok(SharedShape::ball(*radius)),
        Contour::Rectangle { width, length } => Ok(SharedShape::cuboid(length / 2.0, width / 2.0)),
        _ => {
            let points: Vec<Point<Real>> = contour
                .vertices()
                .iter()
                .map(|v| point![v.x, v.y])
                .collect();
            SharedShape::convex_polyline(points)
                .ok_or_else(|| ConfigError::InvalidContour("degenerate convex polygon".into()))
        }
    }
}

fn isometry(coordinates: &Coordinates) -> Isometry<Real> {
    Isometry::new(
        vector![coordinates.position.x, coordinates.position.y],
        coordinates.angle,
    )
}

// ---------------------------------------------------------------------------
// Body and collider management
// ---------------------------------------------------------------------------

impl PhysicsContext {
    pub fn add_body(&mut self, kind: BodyKind, at: Coordinates) -> RigidBodyHandle {
        let builder = match kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(self.linear_damping)
                .angular_damping(self.angular_damping)
                .can_sleep(false),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let body = builder
            .translation(vector![at.position.x, at.position.y])
            .rotation(at.angle)
            .build();
        self.rigid_body_set.insert(body)
    }

    pub fn add_collider(
        &mut self,
        body: RigidBodyHandle,
        spec: &ColliderSpec,
    ) -> Result<ColliderHandle, ConfigError> {
        let shape = shape_from_contour(&spec.contour)?;
        let mut builder = ColliderBuilder::new(shape)
            .sensor(spec.sensor)
            .friction(spec.friction)
            .restitution(spec.restitution)
            .user_data(spec.group)
            .enabled(spec.enabled);
        if spec.sensor {
            builder = builder
                .density(0.0)
                .active_collision_types(ActiveCollisionTypes::all());
        } else if let Some(mass) = spec.mass {
            builder = builder.mass(mass);
        }
        if spec.group != 0 {
            builder = builder.active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS);
        }
        Ok(self
            .collider_set
            .insert_with_parent(builder.build(), body, &mut self.rigid_body_set))
    }

    /// Remove a body with its colliders and joints. `false` if it was already gone.
    pub fn remove_body(&mut self, body: RigidBodyHandle) -> bool {
        let removed = self
            .rigid_body_set
            .remove(
                body,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();
        trace!(?body, removed, "remove body");
        removed
    }

    pub fn contains_body(&self, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(body)
    }

    pub fn collider_parent(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(collider).and_then(Collider::parent)
    }

    pub fn body_colliders(&self, body: RigidBodyHandle) -> Vec<ColliderHandle> {
        self.rigid_body_set
            .get(body)
            .map(|b| b.colliders().to_vec())
            .unwrap_or_default()
    }

    // -- Pose and velocity --

    pub fn pose(&self, body: RigidBodyHandle) -> Option<Coordinates> {
        self.rigid_body_set.get(body).map(|b| {
            let t = b.translation();
            Coordinates::new(Vec2::new(t.x, t.y), b.rotation().angle())
        })
    }

    /// Linear and angular velocity.
    pub fn velocity(&self, body: RigidBodyHandle) -> Option<(Vec2, f32)> {
        self.rigid_body_set.get(body).map(|b| {
            let v = b.linvel();
            (Vec2::new(v.x, v.y), b.angvel())
        })
    }

    pub fn mass(&self, body: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(body).map(|b| b.mass())
    }

    /// Teleport without integrating the path in between.
    pub fn set_pose(&mut self, body: RigidBodyHandle, at: Coordinates) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            let iso = isometry(&at);
            b.set_position(iso, true);
            if b.is_kinematic() {
                b.set_next_kinematic_position(iso);
            }
        }
    }

    /// Kinematic bodies move to `at` during the next sub-step.
    pub fn drive_kinematic(&mut self, body: RigidBodyHandle, at: Coordinates) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_next_kinematic_position(isometry(&at));
        }
    }

    pub fn set_velocity(&mut self, body: RigidBodyHandle, linear: Vec2, angular: f32) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_linvel(vector![linear.x, linear.y], true);
            b.set_angvel(angular, true);
        }
    }

    pub fn set_angular_velocity(&mut self, body: RigidBodyHandle, angular: f32) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_angvel(angular, true);
        }
    }

    /// Clear user forces. Forces otherwise persist across sub-steps.
    pub fn reset_forces(&mut self, body: RigidBodyHandle) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.reset_forces(true);
            b.reset_torques(true);
        }
    }

    /// Add a world-frame force at the centre of mass.
    pub fn add_force(&mut self, body: RigidBodyHandle, force: Vec2) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.add_force(vector![force.x, force.y], true);
        }
    }

    // -- Enabling --

    pub fn set_body_enabled(&mut self, body: RigidBodyHandle, enabled: bool) {
        for handle in self.body_colliders(body) {
            if let Some(c) = self.collider_set.get_mut(handle) {
                c.set_enabled(enabled);
            }
        }
    }

    /// Whether every collider of `body` takes part in the simulation.
    pub fn body_enabled(&self, body: RigidBodyHandle) -> bool {
        let colliders = self.body_colliders(body);
        !colliders.is_empty()
            && colliders
                .iter()
                .all(|h| self.collider_set.get(*h).is_some_and(Collider::is_enabled))
    }

    // -- Queries --

    /// Whether `contour` placed at `at` would intersect any enabled solid
    /// collider not attached to one of `ignore`.
    pub fn overlaps(
        &self,
        contour: &Contour,
        at: Coordinates,
        ignore: &[RigidBodyHandle],
    ) -> Result<bool, ConfigError> {
        let shape = shape_from_contour(contour)?;
        let probe = isometry(&at);
        Ok(self.collider_set.iter().any(|(_, collider)| {
            if collider.is_sensor() || !collider.is_enabled() {
                return false;
            }
            let parent = collider.parent();
            if parent.is_some_and(|p| ignore.contains(&p)) {
                return false;
            }
            let pose = self.collider_world_pose(collider);
            query::intersection_test(&probe, &*shape, &pose, collider.shape()).unwrap_or(false)
        }))
    }

    // Bodies teleported since the last sub-step have stale collider poses,
    // so compose from the parent body instead.
    fn collider_world_pose(&self, collider: &Collider) -> Isometry<Real> {
        match (
            collider.parent().and_then(|p| self.rigid_body_set.get(p)),
            collider.position_wrt_parent(),
        ) {
            (Some(body), Some(rel)) => body.position() * rel,
            _ => *collider.position(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
