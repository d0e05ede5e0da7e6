//! Part pivots and grasp bundles.

use std::f32::consts::TAU;

use playground_core::Vec2;
use playground_core::types::wrap_angle;
use rapier2d::prelude::{
    ImpulseJointHandle, JointAxis, MotorModel, RevoluteJointBuilder, RigidBodyHandle, point,
};

use crate::context::PhysicsContext;

/// Pins per grasp. Four pins at distinct points lock translation and rotation.
pub const GRASP_PIN_COUNT: usize = 4;

/// Damping gain of the pivot's velocity motor. Acceleration-based, so the
/// relative rate reaches its target within a sub-step whatever the masses.
pub const MOTOR_FACTOR: f32 = 1.0e4;

/// Geometry of a part's pivot on its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotSpec {
    /// Pivot point in the anchor's local frame.
    pub pivot_on_anchor: Vec2,
    /// Pivot point in the part's local frame.
    pub pivot_on_part: Vec2,
    /// Relative angle at rest.
    pub angle_offset: f32,
    /// Full width of the allowed relative angle, centred on `angle_offset`.
    pub rotation_range: f32,
}

impl PivotSpec {
    /// `[angle_offset - range/2, angle_offset + range/2]`.
    #[must_use]
    pub fn limits(&self) -> [f32; 2] {
        let half = self.rotation_range / 2.0;
        [self.angle_offset - half, self.angle_offset + half]
    }

    /// A full turn or more leaves the pivot unlimited.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.rotation_range < TAU
    }
}

impl PhysicsContext {
    /// Pivot, rotary limit and velocity motor in one revolute joint.
    /// Contacts between the two bodies are disabled.
    pub fn add_pivot_joint(
        &mut self,
        anchor: RigidBodyHandle,
        part: RigidBodyHandle,
        spec: &PivotSpec,
    ) -> ImpulseJointHandle {
        let mut joint = RevoluteJointBuilder::new()
            .local_anchor1(point![spec.pivot_on_anchor.x, spec.pivot_on_anchor.y])
            .local_anchor2(point![spec.pivot_on_part.x, spec.pivot_on_part.y])
            .contacts_enabled(false)
            .motor_model(MotorModel::AccelerationBased)
            .motor_velocity(0.0, MOTOR_FACTOR);
        if spec.is_limited() {
            joint = joint.limits(spec.limits());
        }
        self.impulse_joint_set.insert(anchor, part, joint, true)
    }

    /// Set the motor's target angular velocity. `false` if the joint is gone.
    pub fn set_motor_velocity(&mut self, joint: ImpulseJointHandle, velocity: f32) -> bool {
        let Some(j) = self.impulse_joint_set.get_mut(joint) else {
            return false;
        };
        j.data
            .set_motor_velocity(JointAxis::AngX, velocity, MOTOR_FACTOR);
        let bodies = [j.body1, j.body2];
        for body in bodies {
            if let Some(b) = self.rigid_body_set.get_mut(body) {
                b.wake_up(true);
            }
        }
        true
    }

    /// Angle of `part` relative to `anchor`, wrapped to `[-π, π]`.
    pub fn relative_angle(&self, anchor: RigidBodyHandle, part: RigidBodyHandle) -> Option<f32> {
        let a = self.pose(anchor)?;
        let p = self.pose(part)?;
        Some(wrap_angle(p.angle - a.angle))
    }

    /// Rigidly attach `held` to `holder` with [`GRASP_PIN_COUNT`] pin joints
    /// placed `radius` away from the held body's centre.
    pub fn add_grasp_bundle(
        &mut self,
        holder: RigidBodyHandle,
        held: RigidBodyHandle,
        radius: f32,
    ) -> Vec<ImpulseJointHandle> {
        let (Some(holder_pose), Some(held_pose)) = (self.pose(holder), self.pose(held)) else {
            return Vec::new();
        };
        let offsets = [
            Vec2::new(radius, 0.0),
            Vec2::new(0.0, radius),
            Vec2::new(-radius, 0.0),
            Vec2::new(0.0, -radius),
        ];
        offsets
            .iter()
            .map(|offset| {
                let world = held_pose.position + offset;
                let on_holder = holder_pose.inverse_transform_point(world);
                let on_held = held_pose.inverse_transform_point(world);
                let pin = RevoluteJointBuilder::new()
                    .local_anchor1(point![on_holder.x, on_holder.y])
                    .local_anchor2(point![on_held.x, on_held.y])
                    .contacts_enabled(false);
                self.impulse_joint_set.insert(holder, held, pin, true)
            })
            .collect()
    }

    /// Remove joints, returning how many were still present.
    pub fn remove_joints(&mut self, joints: &[ImpulseJointHandle]) -> usize {
        joints
            .iter()
            .filter(|h| self.impulse_joint_set.remove(**h, true).is_some())
            .count()
    }

    /// Number of joints linking the two bodies, in either order.
    pub fn joints_between(&self, a: RigidBodyHandle, b: RigidBodyHandle) -> usize {
        self.impulse_joint_set
            .iter()
            .filter(|(_, j)| (j.body1 == a && j.body2 == b) || (j.body1 == b && j.body2 == a))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn limits_centre_on_offset() {
        let spec = PivotSpec {
            pivot_on_anchor: Vec2::zeros(),
            pivot_on_part: Vec2::zeros(),
            angle_offset: 0.5,
            rotation_range: 1.0,
        };
        assert_eq!(spec.limits(), [0.0, 1.0]);
        assert!(spec.is_limited());
    }

    #[test]
    fn full_turn_is_unlimited() {
        let spec = PivotSpec {
            pivot_on_anchor: Vec2::zeros(),
            pivot_on_part: Vec2::zeros(),
            angle_offset: 0.0,
            rotation_range: 2.0 * PI,
        };
        assert!(!spec.is_limited());
    }
}
