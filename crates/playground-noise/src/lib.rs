//! Noise models for actuator commands.
//!
//! Continuous commands are perturbed by an additive [`NoiseModel`]; discrete
//! commands are perturbed by [`FlipNoise`], which replaces the committed value
//! with another allowed value at a configured probability.
//!
//! Every sampling method takes an explicit `&mut R: Rng` so a seeded
//! generator reproduces the exact same perturbations.
//!
//! ```
//! use playground_noise::prelude::*;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut noise = NoiseModel::gaussian(0.0, 0.05).unwrap();
//! let noisy = noise.apply(0.5, &mut rng);
//! assert!((noisy - 0.5).abs() < 1.0);
//! ```

pub mod config;
pub mod flip;
pub mod model;

pub mod prelude {
    pub use crate::config::NoiseConfig;
    pub use crate::flip::FlipNoise;
    pub use crate::model::{NoiseError, NoiseModel};
}
