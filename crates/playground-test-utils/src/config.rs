//! Playground configurations for tests.

use playground_core::{CheckMode, PlaygroundConfig};

/// Unwalled playground with hard command checks.
pub fn open_config(seed: u64) -> PlaygroundConfig {
    PlaygroundConfig::default()
        .with_seed(seed)
        .with_walls(false)
        .with_check_mode(CheckMode::Hard)
}

/// Default 300x300 walled arena.
pub fn walled_config(seed: u64) -> PlaygroundConfig {
    PlaygroundConfig::default().with_seed(seed)
}
