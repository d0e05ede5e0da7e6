//! TOML scene files.
//!
//! A scene is a [`PlaygroundConfig`] plus lists of element, agent, spawner
//! and timer entries. Element and agent entries are resolved through a
//! [`Registry`], so `type = "apple"` picks up the preset and any key given in
//! the entry overrides it.
//!
//! ```toml
//! [playground]
//! size = [200.0, 200.0]
//! time_limit = 500
//!
//! [[elements]]
//! type = "door"
//! name = "gate"
//! contour = { shape = "rectangle", width = 40.0, length = 5.0 }
//! coordinates = { position = [150.0, 100.0] }
//!
//! [[elements]]
//! type = "switch"
//! door = "gate"
//! contour = { shape = "circle", radius = 5.0 }
//! coordinates = { position = [50.0, 50.0] }
//!
//! [[agents]]
//! type = "base"
//! coordinates = { position = [100.0, 30.0] }
//! ```
//!
//! Elements may only name elements declared above them, except teleporter
//! targets, which are linked once every element exists.

use std::path::Path;

use playground_core::{ConfigError, PlaygroundConfig, PlaygroundError, Timer, TimerConfig};
use serde::Deserialize;
use toml::Table;
use tracing::info;

use crate::elements::ElementConfig;
use crate::mutation::Destination;
use crate::playground::Playground;
use crate::registry::Registry;
use crate::spawner::SpawnerConfig;

/// A timer that activates the named element on every tic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneTimer {
    #[serde(flatten)]
    pub timer: TimerConfig,
    pub target: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub playground: PlaygroundConfig,
    #[serde(default)]
    pub elements: Vec<Table>,
    #[serde(default)]
    pub agents: Vec<Table>,
    #[serde(default)]
    pub spawners: Vec<SpawnerConfig>,
    #[serde(default)]
    pub timers: Vec<SceneTimer>,
}

impl SceneConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build a playground with every entry in declaration order.
    ///
    /// Fails on the first entry that cannot be built or placed; nothing is
    /// returned half-built.
    pub fn build(&self, registry: &Registry) -> Result<Playground, PlaygroundError> {
        let mut playground = Playground::new(self.playground.clone())?;

        let mut teleporters = Vec::new();
        for entry in &self.elements {
            let config = registry.element_config(entry)?;
            let element = config.build(&|name| playground.element_by_name(name))?;
            let id = playground.add(element)?;
            if let ElementConfig::Teleporter(t) = &config {
                if let Some(target) = &t.target {
                    teleporters.push((id, target.clone()));
                }
            }
        }
        for (id, target) in teleporters {
            let destination = playground.element_by_name(&target).ok_or_else(|| {
                ConfigError::invalid("target", format!("unknown element `{target}`"))
            })?;
            playground.set_teleport_destination(id, Destination::Element(destination))?;
        }

        for entry in &self.agents {
            playground.add_agent(registry.agent(entry)?)?;
        }
        for spawner in &self.spawners {
            playground.add_spawner(spawner.build()?);
        }
        for entry in &self.timers {
            let target = playground.element_by_name(&entry.target).ok_or_else(|| {
                ConfigError::invalid("target", format!("unknown element `{}`", entry.target))
            })?;
            playground.add_timer(Timer::from_config(&entry.timer)?, target)?;
        }

        info!(
            elements = self.elements.len(),
            agents = self.agents.len(),
            spawners = self.spawners.len(),
            timers = self.timers.len(),
            "scene built"
        );
        Ok(playground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;

    const SCENE: &str = r#"
        [playground]
        size = [200.0, 200.0]
        walls = false
        seed = 3

        [[elements]]
        type = "teleporter"
        name = "a"
        target = "b"
        contour = { shape = "circle", radius = 5.0 }
        coordinates = { position = [20.0, 20.0] }

        [[elements]]
        type = "teleporter"
        name = "b"
        target = "a"
        contour = { shape = "circle", radius = 5.0 }
        coordinates = { position = [180.0, 180.0] }

        [[elements]]
        type = "apple"
        name = "snack"
        coordinates = { position = [100.0, 100.0] }

        [[agents]]
        type = "base"
        name = "runner"
        coordinates = { position = [60.0, 60.0] }

        [[timers]]
        kind = "periodic"
        durations = [5]
        target = "snack"
    "#;

    #[test]
    fn scene_builds_and_links_teleporters() {
        let registry = Registry::with_defaults().unwrap();
        let scene = SceneConfig::from_toml_str(SCENE).unwrap();
        let pg = scene.build(&registry).unwrap();
        let a = pg.element_by_name("a").unwrap();
        let b = pg.element_by_name("b").unwrap();
        let ElementKind::Teleporter(t) = &pg.element(a).unwrap().kind else {
            panic!("teleporter expected");
        };
        assert_eq!(t.destination(), Destination::Element(b));
        assert!(pg.agent_by_name("runner").is_some());
        assert!(pg.element_by_name("snack").is_some());
    }

    #[test]
    fn unknown_references_fail() {
        let registry = Registry::with_defaults().unwrap();
        let bad_timer = format!("{SCENE}\n[[timers]]\nkind = \"periodic\"\ndurations = [2]\ntarget = \"ghost\"\n");
        let scene = SceneConfig::from_toml_str(&bad_timer).unwrap();
        assert!(matches!(
            scene.build(&registry),
            Err(PlaygroundError::Config(ConfigError::InvalidValue { .. }))
        ));

        let forward_switch = r#"
            [[elements]]
            type = "switch"
            door = "later"
            contour = { shape = "circle", radius = 3.0 }
            coordinates = { position = [10.0, 10.0] }
        "#;
        let scene = SceneConfig::from_toml_str(forward_switch).unwrap();
        assert!(scene.build(&registry).is_err());
    }

    #[test]
    fn empty_scene_uses_defaults() {
        let scene = SceneConfig::from_toml_str("").unwrap();
        let pg = scene.build(&Registry::new()).unwrap();
        assert_eq!(pg.config().size, [300.0, 300.0]);
        assert_eq!(pg.elements().count(), 0);
    }
}
