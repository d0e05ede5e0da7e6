//! Integration test: element interactions driven through `step()`.
//!
//! 1. Zones pay at most once per tick regardless of sub-steps
//! 2. Edibles shrink bite by bite and vanish below their floor
//! 3. Dispensers stop at their production limit and forget it on reset
//! 4. Switches toggle doors on the first tick of contact only
//! 5. Keys open locks and chests, coins pay vending machines
//! 6. Teleporters relocate agents, spawners fill their area
//! 7. Trajectories restart from their first point on reset

mod common;

use approx::assert_relative_eq;
use common::{arm_agent, command, element, idle, walker};
use playground_core::{Contour, ContourConfig, Coordinates, Vec2};
use playground_sim::elements::{
    Chest, Coin, Dispenser, Door, Edible, ElementConfig, Key, Lock, OpenCloseSwitch, RewardZone,
    Teleporter, TimerSwitch, VendingMachine,
};
use playground_sim::mutation::Destination;
use playground_sim::prelude::*;
use playground_sim::trajectory::Trajectory;
use playground_sim::{EntityFlags, LifeState};
use playground_test_utils::{assert_pose_near, open_config};

fn zone(reward: f32, x: f32, y: f32) -> Element {
    element(
        Contour::circle(30.0).unwrap(),
        ElementKind::RewardZone(RewardZone::new(reward, None).unwrap()),
        x,
        y,
    )
    .with_flags(EntityFlags {
        traversable: true,
        ..EntityFlags::default()
    })
}

/// Fixed target whose halo reaches a gem placed 18 units from its centre.
fn gem_target(kind: ElementKind, x: f32, y: f32) -> Element {
    element(Contour::circle(10.0).unwrap(), kind, x, y)
        .with_interaction_range(5.0)
        .unwrap()
}

fn key(key_id: &str, x: f32, y: f32) -> Element {
    element(Contour::circle(4.0).unwrap(), ElementKind::Key(Key::new(key_id)), x, y)
        .with_mass(1.0)
        .unwrap()
}

fn attached(pg: &Playground, id: ElementId) -> bool {
    pg.element(id).unwrap().core.is_attached()
}

fn distance(pg: &Playground, agent: AgentId, to: Vec2) -> f32 {
    (pg.agent_pose(agent).unwrap().position - to).norm()
}

fn door_open(pg: &Playground, door: ElementId) -> bool {
    match &pg.element(door).unwrap().kind {
        ElementKind::Door(d) => d.is_open(),
        other => panic!("door expected, got {}", other.name()),
    }
}

#[test]
fn zone_pays_once_per_tick() {
    let config = open_config(1).with_substeps(8);
    let mut pg = Playground::new(config).unwrap();
    pg.add(zone(1.0, 100.0, 100.0)).unwrap();
    let agent = pg.add_agent(walker(100.0, 100.0)).unwrap();
    pg.reset().unwrap();
    for _ in 0..5 {
        let result = pg.step(&idle()).unwrap();
        assert_relative_eq!(result.rewards[&agent], 1.0);
    }
    assert_relative_eq!(pg.agent(agent).unwrap().episode_reward(), 5.0);
    assert_relative_eq!(pg.episode().total_reward, 5.0);
}

#[test]
fn edible_shrinks_until_its_floor() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let apple = pg
        .add(
            element(
                Contour::circle(10.0).unwrap(),
                ElementKind::Edible(Edible::new(10.0, 0.5, 2.0).unwrap()),
                72.0,
                50.0,
            )
            .with_interaction_range(5.0)
            .unwrap(),
        )
        .unwrap();
    let agent = pg.add_agent(walker(50.0, 50.0)).unwrap();
    pg.reset().unwrap();

    // Without the eat command nothing happens.
    let result = pg.step(&idle()).unwrap();
    assert_relative_eq!(result.rewards[&agent], 0.0);

    let eat = command(agent, &[("eat", 1.0)]);
    let bites: Vec<f32> = (0..4)
        .map(|_| pg.step(&eat).unwrap().rewards[&agent])
        .collect();
    assert_relative_eq!(bites[0], 10.0);
    assert_relative_eq!(bites[1], 5.0);
    assert_relative_eq!(bites[2], 2.5);
    assert_relative_eq!(bites[3], 0.0);
    assert_eq!(pg.element(apple).unwrap().core.state(), LifeState::Removed);

    // Reset restores the full apple.
    pg.reset().unwrap();
    let restored = pg.element(apple).unwrap();
    assert!(restored.core.is_attached());
    assert_eq!(*restored.core.contour(), Contour::circle(10.0).unwrap());
    let ElementKind::Edible(e) = &restored.kind else {
        panic!("edible expected");
    };
    assert_relative_eq!(e.reward(), 10.0);
}

#[test]
fn dispenser_stops_at_limit() {
    let mut pg = Playground::new(open_config(7)).unwrap();
    let dispenser = pg
        .add(element(
            Contour::circle(5.0).unwrap(),
            ElementKind::Dispenser(
                Dispenser::new(ElementConfig::basic(ContourConfig::circle(2.0)), 3).unwrap(),
            ),
            150.0,
            150.0,
        ))
        .unwrap();
    pg.reset().unwrap();

    for _ in 0..5 {
        pg.step(&idle()).unwrap();
        pg.activate(dispenser, Activator::Timer).unwrap();
    }
    let ElementKind::Dispenser(d) = &pg.element(dispenser).unwrap().kind else {
        panic!("dispenser expected");
    };
    assert_eq!(d.produced(), 3);
    let products = pg
        .elements()
        .filter(|(_, e)| e.core.flags.temporary)
        .count();
    assert_eq!(products, 3);

    pg.reset().unwrap();
    assert_eq!(pg.elements().count(), 1);
    let ElementKind::Dispenser(d) = &pg.element(dispenser).unwrap().kind else {
        panic!("dispenser expected");
    };
    assert_eq!(d.produced(), 0);
}

#[test]
fn switch_toggles_door_once_per_contact() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let door = pg
        .add(element(
            Contour::rectangle(60.0, 5.0).unwrap(),
            ElementKind::Door(Door::new(false)),
            200.0,
            100.0,
        ))
        .unwrap();
    let switch = element(
        Contour::circle(5.0).unwrap(),
        ElementKind::Switch(OpenCloseSwitch::new(door)),
        72.0,
        50.0,
    );
    pg.add(switch).unwrap();
    let agent = pg.add_agent(walker(50.0, 50.0)).unwrap();
    pg.reset().unwrap();
    assert!(!door_open(&pg, door));

    pg.step(&idle()).unwrap();
    assert!(door_open(&pg, door));
    assert!(!pg.element(door).unwrap().core.visible());

    // Staying in contact does not toggle again.
    for _ in 0..3 {
        pg.step(&idle()).unwrap();
    }
    assert!(door_open(&pg, door));

    // The open door lets the agent through.
    pg.move_agent(agent, Coordinates::at(200.0, 100.0), true, false)
        .unwrap();
    pg.step(&idle()).unwrap();

    // Leave and come back: closes.
    pg.move_agent(agent, Coordinates::at(50.0, 50.0), true, false)
        .unwrap();
    pg.step(&idle()).unwrap();
    assert!(!door_open(&pg, door));
    assert!(pg.element(door).unwrap().core.visible());
}

#[test]
fn timer_switch_closes_door_after_countdown() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let door = pg
        .add(element(
            Contour::rectangle(60.0, 5.0).unwrap(),
            ElementKind::Door(Door::new(false)),
            200.0,
            100.0,
        ))
        .unwrap();
    let switch = pg
        .add(element(
            Contour::circle(5.0).unwrap(),
            ElementKind::TimerSwitch(TimerSwitch::new(door, 3).unwrap()),
            50.0,
            200.0,
        ))
        .unwrap();
    pg.reset().unwrap();
    pg.activate(switch, Activator::Timer).unwrap();
    assert!(door_open(&pg, door));

    let mut open_ticks = 0;
    for _ in 0..6 {
        pg.step(&idle()).unwrap();
        if door_open(&pg, door) {
            open_ticks += 1;
        }
    }
    assert!(open_ticks > 0 && open_ticks < 6, "open for {open_ticks} ticks");
    assert!(!door_open(&pg, door));
}

#[test]
fn matching_key_opens_lock_and_door() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let door = pg
        .add(element(
            Contour::rectangle(60.0, 5.0).unwrap(),
            ElementKind::Door(Door::new(false)),
            250.0,
            100.0,
        ))
        .unwrap();
    let lock = pg
        .add(gem_target(ElementKind::Lock(Lock::new("red", door)), 100.0, 100.0))
        .unwrap();
    let red = pg.add(key("red", 118.0, 100.0)).unwrap();
    let blue = pg.add(key("blue", 82.0, 100.0)).unwrap();
    pg.reset().unwrap();
    assert!(!door_open(&pg, door));

    pg.step(&idle()).unwrap();
    assert!(door_open(&pg, door));
    assert!(!attached(&pg, lock));
    assert!(!attached(&pg, red));
    assert!(attached(&pg, blue), "wrong key must survive");

    pg.reset().unwrap();
    assert!(!door_open(&pg, door));
    assert!(attached(&pg, lock) && attached(&pg, red));
}

#[test]
fn chest_releases_treasure_where_it_stood() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let chest = pg
        .add(gem_target(
            ElementKind::Chest(Chest::new(
                "gold",
                ElementConfig::basic(ContourConfig::circle(3.0)),
            )),
            100.0,
            100.0,
        ))
        .unwrap();
    let gold = pg.add(key("gold", 118.0, 100.0)).unwrap();
    pg.reset().unwrap();

    pg.step(&idle()).unwrap();
    assert!(!attached(&pg, chest));
    assert!(!attached(&pg, gold));
    let treasure: Vec<ElementId> = pg
        .elements()
        .filter(|(_, e)| e.core.flags.temporary && e.core.is_attached())
        .map(|(id, _)| id)
        .collect();
    assert_eq!(treasure.len(), 1);
    assert_pose_near(
        &pg.element_pose(treasure[0]).unwrap(),
        &Coordinates::at(100.0, 100.0),
        1e-3,
    );

    pg.reset().unwrap();
    assert!(pg.is_destroyed(treasure[0]));
    assert!(attached(&pg, chest) && attached(&pg, gold));
}

#[test]
fn coin_pays_its_last_holder() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let agent = pg.add_agent(arm_agent(100.0, 100.0)).unwrap();
    let coin = pg
        .add(
            element(
                Contour::circle(4.0).unwrap(),
                ElementKind::Coin(Coin::new()),
                136.0,
                100.0,
            )
            .with_flags(EntityFlags {
                graspable: true,
                ..EntityFlags::default()
            })
            .with_mass(1.0)
            .unwrap(),
        )
        .unwrap();
    pg.add(gem_target(
        ElementKind::VendingMachine(VendingMachine::new(7.0)),
        250.0,
        250.0,
    ))
    .unwrap();
    pg.reset().unwrap();

    pg.step(&command(agent, &[("grasp", 1.0)])).unwrap();
    let ElementKind::Coin(c) = &pg.element(coin).unwrap().kind else {
        panic!("coin expected");
    };
    assert_eq!(c.last_holder(), Some(agent));

    // Let go, then drop the coin into the machine.
    pg.step(&idle()).unwrap();
    assert!(pg.agent(agent).unwrap().grasp().is_none());
    pg.move_element(coin, Coordinates::at(268.0, 250.0), true).unwrap();

    let result = pg.step(&idle()).unwrap();
    assert_relative_eq!(result.rewards[&agent], 7.0);
    assert!(!attached(&pg, coin));
}

#[test]
fn teleporter_sends_agent_to_coordinates() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let target = Coordinates::at(250.0, 250.0);
    pg.add(element(
        Contour::circle(5.0).unwrap(),
        ElementKind::Teleporter(Teleporter::new(Destination::Coordinates(target))),
        72.0,
        50.0,
    ))
    .unwrap();
    let agent = pg.add_agent(walker(50.0, 50.0)).unwrap();
    pg.reset().unwrap();

    pg.step(&idle()).unwrap();
    assert!(distance(&pg, agent, target.position) < 1e-3);

    // Nothing to touch at the destination: it stays put.
    pg.step(&idle()).unwrap();
    assert!(distance(&pg, agent, target.position) < 1.0);
}

#[test]
fn arriving_on_a_teleporter_does_not_bounce() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let far = Coordinates::at(50.0, 250.0);
    let exit = pg
        .add(element(
            Contour::circle(5.0).unwrap(),
            ElementKind::Teleporter(Teleporter::new(Destination::Coordinates(far))),
            250.0,
            250.0,
        ))
        .unwrap();
    pg.add(element(
        Contour::circle(5.0).unwrap(),
        ElementKind::Teleporter(Teleporter::new(Destination::Element(exit))),
        72.0,
        50.0,
    ))
    .unwrap();
    let agent = pg.add_agent(walker(50.0, 50.0)).unwrap();
    pg.reset().unwrap();

    pg.step(&idle()).unwrap();
    assert!(distance(&pg, agent, Vec2::new(250.0, 250.0)) < 30.0);
    for _ in 0..5 {
        pg.step(&idle()).unwrap();
    }
    assert!(distance(&pg, agent, far.position) > 100.0);
}

#[test]
fn spawner_fills_its_area_up_to_the_limit() {
    let mut pg = Playground::new(open_config(3)).unwrap();
    let center = Vec2::new(150.0, 150.0);
    let spawner = Spawner::new(
        ElementConfig::basic(ContourConfig::circle(3.0)),
        CoordinateSampler::circle(center, 100.0).unwrap(),
        1.0,
    )
    .unwrap()
    .with_production_limit(4);
    let index = pg.add_spawner(spawner);
    pg.reset().unwrap();

    for _ in 0..6 {
        pg.step(&idle()).unwrap();
    }
    let spawner = pg.spawner(index).unwrap();
    assert_eq!(spawner.produced(), 4);
    let products = spawner.live().to_vec();
    assert_eq!(products.len(), 4);
    for id in &products {
        let at = pg.element_pose(*id).unwrap();
        assert!((at.position - center).norm() <= 100.0 + 1e-3);
    }

    pg.reset().unwrap();
    assert_eq!(pg.spawner(index).unwrap().produced(), 0);
    assert!(products.iter().all(|id| pg.is_destroyed(*id)));
}

#[test]
fn trajectory_restarts_on_reset() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let path = Trajectory::waypoints(&[Vec2::new(50.0, 50.0), Vec2::new(150.0, 50.0)], 20).unwrap();
    let mover = pg
        .add(
            element(Contour::circle(5.0).unwrap(), ElementKind::Basic, 0.0, 0.0)
                .with_placement(Placement::Trajectory(path)),
        )
        .unwrap();
    pg.reset().unwrap();
    let start = Coordinates::at(50.0, 50.0);
    assert_pose_near(&pg.element_pose(mover).unwrap(), &start, 1e-3);

    pg.step(&idle()).unwrap();
    let first = pg.element_pose(mover).unwrap();
    assert_pose_near(&first, &Coordinates::at(60.0, 50.0), 1e-2);
    for _ in 0..3 {
        pg.step(&idle()).unwrap();
    }
    assert_pose_near(&pg.element_pose(mover).unwrap(), &Coordinates::at(90.0, 50.0), 1e-2);

    pg.reset().unwrap();
    assert_pose_near(&pg.element_pose(mover).unwrap(), &start, 1e-3);
    pg.step(&idle()).unwrap();
    assert_pose_near(&pg.element_pose(mover).unwrap(), &first, 1e-3);
}

#[test]
fn reward_credited_between_ticks_lands_in_the_next_step() {
    let mut pg = Playground::new(open_config(1)).unwrap();
    let apple = pg
        .add(
            element(
                Contour::circle(10.0).unwrap(),
                ElementKind::Edible(Edible::new(10.0, 0.5, 1.0).unwrap()),
                250.0,
                250.0,
            )
            .with_mass(4.0)
            .unwrap(),
        )
        .unwrap();
    let agent = pg.add_agent(walker(50.0, 50.0)).unwrap();
    pg.reset().unwrap();

    assert!(pg.activate(apple, Activator::Agent(agent)).unwrap());
    assert_relative_eq!(pg.step(&idle()).unwrap().rewards[&agent], 10.0);
    assert_relative_eq!(pg.step(&idle()).unwrap().rewards[&agent], 0.0);
    assert_relative_eq!(pg.agent(agent).unwrap().episode_reward(), 10.0);

    // The bite halved size, mass and reward alike.
    let shrunk = pg.element(apple).unwrap();
    assert_eq!(*shrunk.core.contour(), Contour::circle(5.0).unwrap());
    let body = shrunk.core.body().unwrap();
    assert_relative_eq!(pg.physics().mass(body).unwrap(), 2.0, max_relative = 1e-3);
}
