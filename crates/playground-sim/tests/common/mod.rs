//! Fixture agents and elements shared by the integration tests.

#![allow(dead_code)]

use std::f32::consts::PI;

use playground_actuator::prelude::{Actuator, ActuatorKind, CommandMap};
use playground_core::{Contour, Coordinates, Vec2};
use playground_physics::prelude::PivotSpec;
use playground_sim::prelude::*;
use playground_sim::{EntityFlags, Mount};

pub const ARM_PIVOT_ON_BASE: [f32; 2] = [10.0, 0.0];
pub const ARM_PIVOT_ON_ARM: [f32; 2] = [-10.0, 0.0];

/// Circle base with forward/rotation motors and an eat actuator.
pub fn walker(x: f32, y: f32) -> Agent {
    let base = Part::new("base", Contour::circle(10.0).unwrap(), 10.0)
        .unwrap()
        .with_interaction_range(10.0)
        .unwrap()
        .with_actuator(Actuator::new("forward", ActuatorKind::forward_force(100.0)))
        .with_actuator(Actuator::new(
            "rotation",
            ActuatorKind::AngularVelocity {
                max_angular_velocity: 2.0,
            },
        ))
        .with_actuator(Actuator::new("eat", ActuatorKind::Eat));
    Agent::new(base).at(Coordinates::at(x, y))
}

/// Circle base with one arm sticking out along +x. The arm carries a joint
/// motor and a grasp actuator.
pub fn arm_agent(x: f32, y: f32) -> Agent {
    let base = Part::new("base", Contour::circle(10.0).unwrap(), 10.0).unwrap();
    let arm = Part::new("arm", Contour::rectangle(4.0, 20.0).unwrap(), 1.0)
        .unwrap()
        .mounted(Mount {
            anchor: 0,
            pivot: PivotSpec {
                pivot_on_anchor: Vec2::from(ARM_PIVOT_ON_BASE),
                pivot_on_part: Vec2::from(ARM_PIVOT_ON_ARM),
                angle_offset: 0.0,
                rotation_range: PI,
            },
            max_angular_velocity: 2.0,
        })
        .unwrap()
        .with_grasp_range(5.0)
        .unwrap()
        .with_actuator(Actuator::new("arm", ActuatorKind::JointMotor))
        .with_actuator(Actuator::new("grasp", ActuatorKind::Grasp));
    let mut agent = Agent::new(base).at(Coordinates::at(x, y));
    agent.add_part(arm).unwrap();
    agent
}

/// World distance between the two ends of the arm's pivot.
pub fn pivot_gap(playground: &Playground, agent: AgentId) -> f32 {
    let base = playground.part_pose(agent, 0).unwrap();
    let arm = playground.part_pose(agent, 1).unwrap();
    (base.transform_point(Vec2::from(ARM_PIVOT_ON_BASE))
        - arm.transform_point(Vec2::from(ARM_PIVOT_ON_ARM)))
    .norm()
}

pub fn element(contour: Contour, kind: ElementKind, x: f32, y: f32) -> Element {
    Element::new(EntityCore::new(contour), kind).at(Coordinates::at(x, y))
}

/// Small movable ball that can be held.
pub fn ball(x: f32, y: f32) -> Element {
    element(Contour::circle(4.0).unwrap(), ElementKind::Basic, x, y)
        .with_flags(EntityFlags {
            graspable: true,
            ..EntityFlags::default()
        })
        .with_mass(1.0)
        .unwrap()
}

pub fn command(agent: AgentId, pairs: &[(&str, f32)]) -> Commands {
    let map: CommandMap = pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect();
    Commands::from([(agent, map)])
}

pub fn idle() -> Commands {
    Commands::new()
}
