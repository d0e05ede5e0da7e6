//! Additive scalar noise on continuous commands.
//!
//! Models are plain data with static dispatch. A [`NoiseModel::Chain`] feeds
//! the output of each child into the next one.

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Rejected noise parameter.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum NoiseError {
    #[error("{param} must be finite, got {value}")]
    NotFinite { param: &'static str, value: f32 },
    #[error("{param} must not be negative, got {value}")]
    Negative { param: &'static str, value: f32 },
    #[error("empty range [{low}, {high})")]
    EmptyRange { low: f32, high: f32 },
    #[error("probability {value} is outside [0, 1]")]
    InvalidProbability { value: f32 },
}

fn finite(param: &'static str, value: f32) -> Result<f32, NoiseError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NoiseError::NotFinite { param, value })
    }
}

fn scale(param: &'static str, value: f32) -> Result<f32, NoiseError> {
    let value = finite(param, value)?;
    if value < 0.0 {
        return Err(NoiseError::Negative { param, value });
    }
    Ok(value)
}

/// Additive noise model.
///
/// `Bias` holds one offset per episode. It reads `0.0` until the first
/// [`reset`](Self::reset) draws it.
#[derive(Clone, Debug, PartialEq)]
pub enum NoiseModel {
    Gaussian { mean: f32, std: f32 },
    /// Half-open `[low, high)`.
    Uniform { low: f32, high: f32 },
    Bias { std: f32, current: f32 },
    Chain(Vec<Self>),
}

impl NoiseModel {
    pub fn gaussian(mean: f32, std: f32) -> Result<Self, NoiseError> {
        Ok(Self::Gaussian {
            mean: finite("mean", mean)?,
            std: scale("std", std)?,
        })
    }

    pub fn uniform(low: f32, high: f32) -> Result<Self, NoiseError> {
        let (low, high) = (finite("low", low)?, finite("high", high)?);
        if low < high {
            Ok(Self::Uniform { low, high })
        } else {
            Err(NoiseError::EmptyRange { low, high })
        }
    }

    pub fn bias(std: f32) -> Result<Self, NoiseError> {
        scale("std", std).map(|std| Self::Bias { std, current: 0.0 })
    }

    #[must_use]
    pub const fn chain(models: Vec<Self>) -> Self {
        Self::Chain(models)
    }

    /// One additive offset. A chain sums its children.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        match self {
            Self::Gaussian { mean, std } => normal(*mean, *std, rng),
            Self::Uniform { low, high } => Uniform::new(*low, *high).sample(rng),
            Self::Bias { current, .. } => *current,
            Self::Chain(children) => children.iter_mut().map(|c| c.sample(rng)).sum(),
        }
    }

    pub fn apply<R: Rng + ?Sized>(&mut self, value: f32, rng: &mut R) -> f32 {
        if let Self::Chain(children) = self {
            let mut out = value;
            for child in children {
                out = child.apply(out, rng);
            }
            out
        } else {
            value + self.sample(rng)
        }
    }

    pub fn apply_clamped<R: Rng + ?Sized>(
        &mut self,
        value: f32,
        min: f32,
        max: f32,
        rng: &mut R,
    ) -> f32 {
        self.apply(value, rng).clamp(min, max)
    }

    /// New episode: redraw biases. Other variants carry no state.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            Self::Bias { std, current } => *current = normal(0.0, *std, rng),
            Self::Chain(children) => {
                for child in children {
                    child.reset(rng);
                }
            }
            Self::Gaussian { .. } | Self::Uniform { .. } => {}
        }
    }
}

fn normal<R: Rng + ?Sized>(mean: f32, std: f32, rng: &mut R) -> f32 {
    match Normal::new(mean, std) {
        Ok(dist) if std > 0.0 => dist.sample(rng),
        _ => mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn constructors_report_the_offending_parameter() {
        assert_eq!(
            NoiseModel::gaussian(0.0, -2.0),
            Err(NoiseError::Negative { param: "std", value: -2.0 })
        );
        assert!(matches!(
            NoiseModel::gaussian(f32::INFINITY, 1.0),
            Err(NoiseError::NotFinite { param: "mean", .. })
        ));
        assert!(matches!(
            NoiseModel::uniform(0.5, 0.5),
            Err(NoiseError::EmptyRange { .. })
        ));
        assert!(matches!(
            NoiseModel::uniform(f32::NAN, 1.0),
            Err(NoiseError::NotFinite { param: "low", .. })
        ));
        assert!(NoiseModel::bias(-0.1).is_err());
    }

    #[test]
    fn error_messages_are_readable() {
        let err = NoiseModel::uniform(2.0, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "empty range [2, 1)");
    }

    #[test]
    fn degenerate_gaussian_is_a_constant_offset() {
        let mut n = NoiseModel::gaussian(-0.5, 0.0).unwrap();
        assert_eq!(n.apply(1.0, &mut rng(1)), 0.5);
    }

    #[test]
    fn same_seed_same_noise() {
        let mut n = NoiseModel::gaussian(0.0, 0.3).unwrap();
        let first: Vec<f32> = {
            let mut r = rng(5);
            (0..10).map(|_| n.sample(&mut r)).collect()
        };
        let mut r = rng(5);
        let second: Vec<f32> = (0..10).map(|_| n.sample(&mut r)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_samples_fall_inside_range() {
        let mut n = NoiseModel::uniform(-0.1, 0.2).unwrap();
        let mut r = rng(3);
        assert!((0..300).all(|_| (-0.1..0.2).contains(&n.sample(&mut r))));
    }

    #[test]
    fn bias_is_fixed_within_an_episode() {
        let mut n = NoiseModel::bias(1.0).unwrap();
        let mut r = rng(11);
        assert_eq!(n.sample(&mut r), 0.0);

        n.reset(&mut r);
        let offset = n.sample(&mut r);
        assert_ne!(offset, 0.0);
        assert!((0..5).all(|_| n.sample(&mut r) == offset));

        n.reset(&mut r);
        assert_ne!(n.sample(&mut r), offset);
    }

    #[test]
    fn chain_feeds_each_stage_into_the_next() {
        let mut n = NoiseModel::chain(vec![
            NoiseModel::gaussian(1.0, 0.0).unwrap(),
            NoiseModel::gaussian(-0.25, 0.0).unwrap(),
        ]);
        assert_eq!(n.apply(0.0, &mut rng(0)), 0.75);
        assert_eq!(n.sample(&mut rng(0)), 0.75);
    }

    #[test]
    fn clamped_output_respects_limits() {
        let mut n = NoiseModel::gaussian(0.0, 4.0).unwrap();
        let mut r = rng(8);
        for _ in 0..300 {
            let v = n.apply_clamped(0.0, 0.0, 1.0, &mut r);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
