//! Playground simulator CLI.
//!
//! Provides two modes of operation:
//! - `headless`: Load a TOML scene, drive every agent with a random
//!   controller for N episodes and print statistics
//! - `info`: Print workspace crate versions and the registered types

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use playground_actuator::prelude::RandomController;
use playground_core::{PlaygroundError, SeedHierarchy};
use playground_sim::prelude::*;

/// Scene used when no file is given: two agents, food and a goal.
const DEFAULT_SCENE: &str = r#"
[playground]
size = [300.0, 300.0]
time_limit = 200

[[elements]]
type = "apple"
sampler = { area = "rectangle", center = [150.0, 150.0], width = 240.0, height = 240.0 }

[[elements]]
type = "rotten_apple"
sampler = { area = "rectangle", center = [150.0, 150.0], width = 240.0, height = 240.0 }

[[elements]]
type = "candy"
sampler = { area = "circle", center = [150.0, 150.0], radius = 100.0 }

[[elements]]
type = "goal_zone"
coordinates = { position = [270.0, 270.0] }

[[agents]]
type = "base"
sampler = { area = "circle", center = [80.0, 80.0], radius = 40.0 }

[[agents]]
type = "arm"
sampler = { area = "circle", center = [220.0, 80.0], radius = 40.0 }
"#;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// 2D multi-agent playground simulator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run episodes locally with random controllers and print statistics.
    Headless {
        /// Scene file. A small built-in scene is used when omitted.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Extra element/agent presets merged into the default registry.
        #[arg(long)]
        presets: Option<PathBuf>,

        /// Number of episodes to run.
        #[arg(short = 'n', long, default_value_t = 1)]
        episodes: u32,

        /// Maximum ticks per episode, overriding the scene's time limit.
        #[arg(short, long)]
        max_steps: Option<u64>,

        /// Root seed, overriding the scene's.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_registry(presets: Option<&PathBuf>) -> Result<Registry, PlaygroundError> {
    let mut registry = Registry::with_defaults()?;
    if let Some(path) = presets {
        let content = std::fs::read_to_string(path).map_err(playground_core::ConfigError::from)?;
        registry.extend_from_toml(&content)?;
    }
    Ok(registry)
}

fn run_headless(
    scene: Option<&PathBuf>,
    presets: Option<&PathBuf>,
    episodes: u32,
    max_steps: Option<u64>,
    seed: Option<u64>,
) -> Result<(), PlaygroundError> {
    let registry = load_registry(presets)?;
    let mut config = match scene {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::from_toml_str(DEFAULT_SCENE)?,
    };
    if let Some(seed) = seed {
        config.playground.seed = seed;
    }
    if max_steps.is_some() {
        config.playground.time_limit = max_steps;
    }
    let limit = config.playground.time_limit.unwrap_or(1000);

    let mut playground = config.build(&registry)?;
    let seeds = SeedHierarchy::new(config.playground.seed);
    let agents: Vec<AgentId> = playground.agents().map(|(id, _)| id).collect();
    for (index, id) in agents.iter().enumerate() {
        let rng = seeds.subsystem_rng(0, index as u64, "controller");
        playground.set_controller(*id, Box::new(RandomController::new(rng)))?;
    }
    info!(agents = agents.len(), episodes, "running headless");

    let commands = Commands::new();
    for ep in 0..episodes {
        playground.reset()?;
        for _ in 0..limit {
            let result = playground.step(&commands)?;
            if result.done || result.truncated {
                break;
            }
        }
        let episode = playground.episode();
        debug!(state = ?episode.state, "episode finished");
        println!(
            "episode {}: ticks={}, reward={:.3}",
            ep + 1,
            episode.tick,
            episode.total_reward
        );
    }

    let stats = playground.stats();
    println!(
        "\ntotal: episodes={}, ticks={}, mean reward={:.3}",
        stats.episodes_completed,
        stats.total_ticks,
        stats.mean_reward().unwrap_or(0.0)
    );
    Ok(())
}

fn run_info() -> Result<(), PlaygroundError> {
    println!("playground v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  playground-core      {}", env!("CARGO_PKG_VERSION"));
    println!("  playground-noise     {}", env!("CARGO_PKG_VERSION"));
    println!("  playground-physics   {}", env!("CARGO_PKG_VERSION"));
    println!("  playground-actuator  {}", env!("CARGO_PKG_VERSION"));
    println!("  playground-sim       {}", env!("CARGO_PKG_VERSION"));
    println!();
    let registry = Registry::with_defaults()?;
    println!("element types:");
    for name in registry.element_types() {
        println!("  {name}");
    }
    println!("agent types:");
    for name in registry.agent_types() {
        println!("  {name}");
    }
    println!();
    println!("edition: 2024");
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Some(Command::Headless {
            scene,
            presets,
            episodes,
            max_steps,
            seed,
        }) => run_headless(scene.as_ref(), presets.as_ref(), episodes, max_steps, seed),
        Some(Command::Info) => run_info(),
        None => run_headless(None, None, 1, None, None),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_builds() {
        let registry = Registry::with_defaults().unwrap();
        let scene = SceneConfig::from_toml_str(DEFAULT_SCENE).unwrap();
        let mut playground = scene.build(&registry).unwrap();
        assert_eq!(playground.agents().count(), 2);
        playground.reset().unwrap();
        playground.step(&Commands::new()).unwrap();
    }

    #[test]
    fn cli_parses_headless() {
        let cli = Cli::try_parse_from(["playground", "headless", "-n", "3", "--seed", "9"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Headless {
                episodes: 3,
                seed: Some(9),
                ..
            })
        ));
    }
}
