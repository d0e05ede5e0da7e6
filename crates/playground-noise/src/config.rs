use serde::{Deserialize, Serialize};

use crate::flip::FlipNoise;
use crate::model::{NoiseError, NoiseModel};

/// Serializable noise description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseConfig {
    Gaussian {
        #[serde(default)]
        mean: f32,
        std: f32,
    },
    Uniform {
        low: f32,
        high: f32,
    },
    Bias {
        std: f32,
    },
    Chain {
        models: Vec<NoiseConfig>,
    },
    /// Discrete only.
    Flip {
        probability: f32,
    },
}

impl NoiseConfig {
    /// Build the additive model. `Flip` has no additive form.
    pub fn build_model(&self) -> Result<Option<NoiseModel>, NoiseError> {
        Ok(Some(match self {
            Self::Gaussian { mean, std } => NoiseModel::gaussian(*mean, *std)?,
            Self::Uniform { low, high } => NoiseModel::uniform(*low, *high)?,
            Self::Bias { std } => NoiseModel::bias(*std)?,
            Self::Chain { models } => {
                let mut built = Vec::with_capacity(models.len());
                for m in models {
                    if let Some(model) = m.build_model()? {
                        built.push(model);
                    }
                }
                NoiseModel::chain(built)
            }
            Self::Flip { .. } => return Ok(None),
        }))
    }

    pub fn build_flip(&self) -> Result<Option<FlipNoise>, NoiseError> {
        match self {
            Self::Flip { probability } => FlipNoise::new(*probability).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_config_builds_model() {
        let cfg = NoiseConfig::Gaussian {
            mean: 0.0,
            std: 0.1,
        };
        assert_eq!(
            cfg.build_model().unwrap(),
            Some(NoiseModel::Gaussian {
                mean: 0.0,
                std: 0.1
            })
        );
        assert_eq!(cfg.build_flip().unwrap(), None);
    }

    #[test]
    fn flip_config_has_no_additive_model() {
        let cfg = NoiseConfig::Flip { probability: 0.3 };
        assert_eq!(cfg.build_model().unwrap(), None);
        assert_eq!(cfg.build_flip().unwrap().map(|f| f.probability()), Some(0.3));
    }

    #[test]
    fn invalid_parameters_propagate() {
        let cfg = NoiseConfig::Chain {
            models: vec![NoiseConfig::Bias { std: -1.0 }],
        };
        assert!(cfg.build_model().is_err());
    }
}
