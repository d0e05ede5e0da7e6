//! Integration test: jointed agents under `step()`.
//!
//! 1. Pivots pull a displaced part back into place
//! 2. Hard mode rejects out-of-range commands, soft mode clamps them
//! 3. Grasping holds an element only while the grasp command is on
//! 4. A rejected step leaves the noise stream untouched

mod common;

use approx::assert_relative_eq;
use common::{arm_agent, ball, command, idle, pivot_gap, walker};
use playground_core::{CheckMode, CommandValidationError, Coordinates, PlaygroundError, Vec2};
use playground_noise::prelude::NoiseConfig;
use playground_physics::prelude::GRASP_PIN_COUNT;
use playground_sim::prelude::*;
use playground_test_utils::{assert_pose_near, open_config};

#[test]
fn agent_is_built_with_pivots_aligned() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    assert!(pivot_gap(&pg, agent) < 1e-3);
    assert_eq!(pg.physics().joint_count(), 1);
    let arm = pg.part_pose(agent, 1).unwrap();
    assert_pose_near(&arm, &Coordinates::at(120.0, 100.0), 1e-3);
}

#[test]
fn displaced_base_drags_arm_back() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    pg.reset().unwrap();

    pg.move_agent(agent, Coordinates::at(130.0, 120.0), false, true)
        .unwrap();
    assert!(pivot_gap(&pg, agent) > 20.0);
    for _ in 0..40 {
        pg.step(&idle()).unwrap();
    }
    let gap = pivot_gap(&pg, agent);
    assert!(gap < 1.0, "pivot gap {gap}");
}

#[test]
fn keep_joints_moves_the_whole_agent() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    pg.reset().unwrap();
    pg.move_agent(agent, Coordinates::at(200.0, 50.0).with_angle(1.0), true, false)
        .unwrap();
    assert!(pivot_gap(&pg, agent) < 1e-3);
    assert_pose_near(
        &pg.agent_pose(agent).unwrap(),
        &Coordinates::at(200.0, 50.0).with_angle(1.0),
        1e-4,
    );

    // The pivot stays closed while the agent settles.
    for tick in 0..20 {
        pg.step(&idle()).unwrap();
        let gap = pivot_gap(&pg, agent);
        assert!(gap < 1e-3, "pivot gap {gap} at tick {tick}");
    }
}

#[test]
fn joint_motor_tracks_commanded_rate() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    pg.reset().unwrap();
    let relative = |pg: &Playground| {
        pg.part_pose(agent, 1).unwrap().angle - pg.part_pose(agent, 0).unwrap().angle
    };

    // Half speed of a 2 rad/s joint over one 0.1 s tick.
    let before = relative(&pg);
    pg.step(&command(agent, &[("arm", 0.5)])).unwrap();
    let turned = relative(&pg) - before;
    assert_relative_eq!(turned, 0.1, epsilon = 0.02);
}

#[test]
fn joint_motor_turns_the_arm() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    pg.reset().unwrap();
    for _ in 0..5 {
        pg.step(&command(agent, &[("arm", 1.0)])).unwrap();
    }
    let base = pg.part_pose(agent, 0).unwrap();
    let arm = pg.part_pose(agent, 1).unwrap();
    assert!(arm.angle - base.angle > 0.1, "relative angle {}", arm.angle - base.angle);
}

#[test]
fn hard_mode_rejects_out_of_range() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(walker(100.0, 100.0)).unwrap();
    pg.reset().unwrap();

    let err = pg.step(&command(agent, &[("forward", 1.5)])).unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Command(CommandValidationError::OutOfRange { .. })
    ));
    assert_eq!(pg.episode().tick, 0);

    let err = pg.step(&command(agent, &[("eat", 0.5)])).unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Command(CommandValidationError::NotAllowed { .. })
    ));

    pg.step(&command(agent, &[("forward", 1.0)])).unwrap();
    assert_eq!(pg.episode().tick, 1);
}

#[test]
fn soft_mode_clamps() {
    let config = open_config(1).with_check_mode(CheckMode::Soft);
    let mut pg = Playground::new(config).unwrap();
    let agent = pg.add_agent(walker(100.0, 100.0)).unwrap();
    pg.reset().unwrap();

    pg.step(&command(agent, &[("forward", 3.0), ("eat", 0.7)])).unwrap();
    let a = pg.agent(agent).unwrap();
    assert_relative_eq!(a.actuator("forward").unwrap().command(), 1.0);
    assert_relative_eq!(a.actuator("eat").unwrap().command(), 1.0);

    // Non-finite values are refused even in soft mode.
    assert!(matches!(
        pg.step(&command(agent, &[("forward", f32::NAN)])),
        Err(PlaygroundError::Command(CommandValidationError::NotFinite))
    ));
}

#[test]
fn grasp_holds_while_commanded() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    // Arm spans x in [110, 130]; the ball sits just past its tip.
    let held = pg.add(ball(136.0, 100.0)).unwrap();
    pg.reset().unwrap();
    assert_eq!(pg.physics().joint_count(), 1);

    // No grasp without the command.
    pg.step(&idle()).unwrap();
    assert!(pg.agent(agent).unwrap().grasp().is_none());

    let grasp = command(agent, &[("grasp", 1.0)]);
    pg.step(&grasp).unwrap();
    let hold = pg.agent(agent).unwrap().grasp().cloned().unwrap();
    assert_eq!(hold.element, held);
    assert_eq!(hold.part, 1);
    assert_eq!(pg.physics().joint_count(), 1 + GRASP_PIN_COUNT);

    // Swinging the arm while holding carries the ball along.
    let swing = command(agent, &[("grasp", 1.0), ("arm", 1.0)]);
    for _ in 0..10 {
        pg.step(&swing).unwrap();
    }
    assert!(pg.agent(agent).unwrap().grasp().is_some());
    let ball_pose = pg.element_pose(held).unwrap();
    assert!(ball_pose.position.y > 105.0, "ball at {:?}", ball_pose.position);

    // Letting go releases every pin.
    pg.step(&idle()).unwrap();
    assert!(pg.agent(agent).unwrap().grasp().is_none());
    assert_eq!(pg.physics().joint_count(), 1);

    // Nothing ties the ball to the hand any more.
    let hand_gap = |pg: &Playground| {
        (pg.element_pose(held).unwrap().position - pg.part_pose(agent, 1).unwrap().position).norm()
    };
    let released_at = hand_gap(&pg);
    pg.set_element_velocity(held, Vec2::new(0.0, 60.0), 0.0).unwrap();
    for _ in 0..5 {
        pg.step(&idle()).unwrap();
    }
    let gap = hand_gap(&pg);
    assert!(gap > released_at + 10.0, "ball still at {gap} from the hand");
}

#[test]
fn removing_a_held_element_releases_it() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    let held = pg.add(ball(136.0, 100.0)).unwrap();
    pg.reset().unwrap();
    pg.step(&command(agent, &[("grasp", 1.0)])).unwrap();
    assert!(pg.agent(agent).unwrap().grasp().is_some());

    pg.remove(held).unwrap();
    assert!(pg.agent(agent).unwrap().grasp().is_none());
    assert_eq!(pg.physics().joint_count(), 1);
}

fn noisy_walker(x: f32, y: f32) -> Agent {
    let noise = NoiseConfig::Gaussian { mean: 0.0, std: 0.2 };
    let base = Part::new("base", Contour::circle(10.0).unwrap(), 10.0)
        .unwrap()
        .with_actuator(
            Actuator::new("forward", ActuatorKind::forward_force(100.0))
                .with_noise(&noise)
                .unwrap(),
        );
    Agent::new(base).at(Coordinates::at(x, y))
}

#[test]
fn rejected_step_does_not_draw_noise() {
    let build = || {
        let mut pg = Playground::new(open_config(5)).unwrap();
        let first = pg.add_agent(noisy_walker(80.0, 80.0)).unwrap();
        let second = pg.add_agent(noisy_walker(200.0, 200.0)).unwrap();
        pg.reset().unwrap();
        (pg, first, second)
    };
    let (mut clean, a, _) = build();
    let (mut rejected, ra, rb) = build();

    // The second agent's command is invalid; the first agent comes first.
    let mut bad = command(ra, &[("forward", 0.5)]);
    bad.extend(command(rb, &[("forward", 2.0)]));
    assert!(rejected.step(&bad).is_err());
    assert_eq!(rejected.episode().tick, 0);

    let go = |id| command(id, &[("forward", 0.5)]);
    for _ in 0..5 {
        clean.step(&go(a)).unwrap();
        rejected.step(&go(ra)).unwrap();
        assert_relative_eq!(
            clean.agent(a).unwrap().actuator("forward").unwrap().command(),
            rejected.agent(ra).unwrap().actuator("forward").unwrap().command()
        );
    }
    assert_eq!(clean.agent_pose(a), rejected.agent_pose(ra));
}
