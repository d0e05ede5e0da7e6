//! Deterministic seed hierarchy for reproducible playgrounds.
//!
//! ```text
//! root
//! └── instance (one per independent playground)
//!     └── episode (per reset)
//!         └── subsystem (controllers, samplers, ...)
//! ```
//!
//! Children are derived with a fixed mixing function instead of
//! `std::hash`, whose output may change between toolchains. A seed written
//! in a scene file therefore replays the same episodes on any build.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// SplitMix64 finaliser.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Child seed for the `index`-th child of `parent`.
#[must_use]
pub const fn derive_seed_indexed(parent: u64, index: u64) -> u64 {
    mix(mix(parent).wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN)))
}

/// Child seed for a named child of `parent`. The name is folded with FNV-1a.
///
/// ```
/// use playground_core::seed::derive_seed;
///
/// let child = derive_seed(42, "spawner");
/// assert_ne!(child, 42);
/// assert_eq!(child, derive_seed(42, "spawner"));
/// ```
#[must_use]
pub fn derive_seed(parent: u64, key: &str) -> u64 {
    let folded = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    });
    derive_seed_indexed(parent, folded)
}

/// Derives every seed of one run from a single root.
///
/// ```
/// use playground_core::SeedHierarchy;
///
/// let seeds = SeedHierarchy::new(42);
/// assert_eq!(seeds.episode_seed(0, 3), SeedHierarchy::new(42).episode_seed(0, 3));
/// assert_ne!(seeds.episode_seed(0, 3), seeds.episode_seed(0, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedHierarchy {
    root: u64,
}

impl SeedHierarchy {
    #[must_use]
    pub const fn new(root: u64) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    #[must_use]
    pub const fn instance_seed(&self, instance: u16) -> u64 {
        derive_seed_indexed(self.root, instance as u64)
    }

    #[must_use]
    pub const fn episode_seed(&self, instance: u16, episode: u64) -> u64 {
        derive_seed_indexed(self.instance_seed(instance), episode)
    }

    #[must_use]
    pub fn subsystem_seed(&self, instance: u16, episode: u64, subsystem: &str) -> u64 {
        derive_seed(self.episode_seed(instance, episode), subsystem)
    }

    /// Stream used by the engine for one episode. Re-derived on every reset.
    #[must_use]
    pub fn episode_rng(&self, instance: u16, episode: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.episode_seed(instance, episode))
    }

    /// Stream for something outside the engine, like a controller.
    #[must_use]
    pub fn subsystem_rng(&self, instance: u16, episode: u64, subsystem: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.subsystem_seed(instance, episode, subsystem))
    }
}
