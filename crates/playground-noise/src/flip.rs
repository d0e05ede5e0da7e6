//! Flip noise for discrete commands.

use rand::Rng;

use crate::model::NoiseError;

/// Replaces a discrete value with a different allowed value with
/// probability `probability`, uniformly among the alternatives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlipNoise {
    probability: f32,
}

impl FlipNoise {
    pub fn new(probability: f32) -> Result<Self, NoiseError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(NoiseError::InvalidProbability { value: probability });
        }
        Ok(Self { probability })
    }

    #[must_use]
    pub const fn probability(&self) -> f32 {
        self.probability
    }

    /// Exactly one uniform draw is consumed per call, plus one more on a flip.
    pub fn apply<R: Rng + ?Sized>(&self, value: f32, allowed: &[f32], rng: &mut R) -> f32 {
        let roll: f32 = rng.r#gen();
        if roll >= self.probability {
            return value;
        }
        let alternatives: Vec<f32> = allowed.iter().copied().filter(|v| *v != value).collect();
        if alternatives.is_empty() {
            return value;
        }
        alternatives[rng.gen_range(0..alternatives.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rejects_probability_outside_unit_interval() {
        assert!(FlipNoise::new(-0.1).is_err());
        assert!(FlipNoise::new(1.5).is_err());
        assert!(FlipNoise::new(f32::NAN).is_err());
    }

    #[test]
    fn zero_probability_never_flips() {
        let noise = FlipNoise::new(0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(noise.apply(1.0, &[0.0, 1.0], &mut rng), 1.0);
        }
    }

    #[test]
    fn certain_flip_always_changes_binary_value() {
        let noise = FlipNoise::new(1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(noise.apply(1.0, &[0.0, 1.0], &mut rng), 0.0);
        }
    }

    #[test]
    fn flip_rate_matches_probability() {
        let noise = FlipNoise::new(0.2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let trials = 20_000;
        let flips = (0..trials)
            .filter(|_| noise.apply(0.0, &[0.0, 1.0, 2.0], &mut rng) != 0.0)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = flips as f32 / trials as f32;
        assert!((rate - 0.2).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn single_allowed_value_is_kept() {
        let noise = FlipNoise::new(1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(noise.apply(4.0, &[4.0], &mut rng), 4.0);
    }
}
