//! Area samplers for initial placement, spawners and dispensers.

use std::f32::consts::TAU;

use playground_core::{ConfigError, Coordinates, Vec2};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Rejection sampling gives up after this many draws and returns the centre.
const MAX_REJECTIONS: usize = 1000;

const fn default_angle_range() -> [f32; 2] {
    [0.0, TAU]
}

/// Region coordinates are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "area", rename_all = "snake_case")]
pub enum Area {
    /// Uniform in an axis-aligned rectangle.
    Rectangle {
        center: [f32; 2],
        width: f32,
        height: f32,
    },
    /// Uniform in a disc, by rejection from the bounding square.
    Circle { center: [f32; 2], radius: f32 },
    /// Gaussian around `center`, truncated to `radius` by rejection.
    Gaussian {
        center: [f32; 2],
        radius: f32,
        std: f32,
    },
}

/// Draws [`Coordinates`] from an [`Area`] and an angle interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSampler {
    #[serde(flatten)]
    pub area: Area,
    #[serde(default = "default_angle_range")]
    pub angle: [f32; 2],
}

impl CoordinateSampler {
    pub fn new(area: Area) -> Result<Self, ConfigError> {
        let sampler = Self {
            area,
            angle: default_angle_range(),
        };
        sampler.validate()?;
        Ok(sampler)
    }

    pub fn rectangle(center: Vec2, width: f32, height: f32) -> Result<Self, ConfigError> {
        Self::new(Area::Rectangle {
            center: [center.x, center.y],
            width,
            height,
        })
    }

    pub fn circle(center: Vec2, radius: f32) -> Result<Self, ConfigError> {
        Self::new(Area::Circle {
            center: [center.x, center.y],
            radius,
        })
    }

    pub fn gaussian(center: Vec2, radius: f32, std: f32) -> Result<Self, ConfigError> {
        Self::new(Area::Gaussian {
            center: [center.x, center.y],
            radius,
            std,
        })
    }

    /// Always use this angle.
    #[must_use]
    pub const fn with_fixed_angle(mut self, angle: f32) -> Self {
        self.angle = [angle, angle];
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32, field: &str| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, "must be finite and > 0"))
            }
        };
        match &self.area {
            Area::Rectangle { width, height, .. } => {
                positive(*width, "width")?;
                positive(*height, "height")?;
            }
            Area::Circle { radius, .. } => positive(*radius, "radius")?,
            Area::Gaussian { radius, std, .. } => {
                positive(*radius, "radius")?;
                positive(*std, "std")?;
            }
        }
        if self.angle[0] > self.angle[1] {
            return Err(ConfigError::invalid("angle", "min must be <= max"));
        }
        Ok(())
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        let c = match &self.area {
            Area::Rectangle { center, .. }
            | Area::Circle { center, .. }
            | Area::Gaussian { center, .. } => center,
        };
        Vec2::new(c[0], c[1])
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinates {
        let center = self.center();
        let offset = match &self.area {
            Area::Rectangle { width, height, .. } => Vec2::new(
                rng.gen_range(-width / 2.0..=width / 2.0),
                rng.gen_range(-height / 2.0..=height / 2.0),
            ),
            Area::Circle { radius, .. } => (0..MAX_REJECTIONS)
                .map(|_| Vec2::new(rng.gen_range(-*radius..=*radius), rng.gen_range(-*radius..=*radius)))
                .find(|p| p.norm() <= *radius)
                .unwrap_or_else(Vec2::zeros),
            Area::Gaussian { radius, std, .. } => match Normal::new(0.0_f32, *std) {
                Ok(normal) => (0..MAX_REJECTIONS)
                    .map(|_| Vec2::new(normal.sample(rng), normal.sample(rng)))
                    .find(|p| p.norm() <= *radius)
                    .unwrap_or_else(Vec2::zeros),
                Err(_) => Vec2::zeros(),
            },
        };
        let angle = if self.angle[0] < self.angle[1] {
            rng.gen_range(self.angle[0]..self.angle[1])
        } else {
            self.angle[0]
        };
        Coordinates::new(center + offset, angle)
    }
}
