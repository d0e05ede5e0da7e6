//! Shape descriptors shared by physics bodies, interaction halos and masks.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Vec2;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Square,
    Rectangle,
    RegularPolygon,
    Polygon,
}

/// Loose shape description as found in configuration files.
///
/// Only the fields relevant to `shape` are read; missing ones are errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    pub shape: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<[f32; 2]>>,
}

impl ContourConfig {
    #[must_use]
    pub const fn circle(radius: f32) -> Self {
        Self {
            shape: ShapeKind::Circle,
            radius: Some(radius),
            width: None,
            length: None,
            sides: None,
            vertices: None,
        }
    }

    #[must_use]
    pub const fn rectangle(width: f32, length: f32) -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            radius: None,
            width: Some(width),
            length: Some(length),
            sides: None,
            vertices: None,
        }
    }
}

fn require(value: Option<f32>, shape: &str, field: &str) -> Result<f32, ConfigError> {
    value.ok_or_else(|| ConfigError::InvalidContour(format!("{shape} requires `{field}`")))
}

fn positive(value: f32, field: &str) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidContour(format!(
            "`{field}` must be finite and > 0, got {value}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Contour
// ---------------------------------------------------------------------------

/// Immutable geometric descriptor, centred on the body origin.
///
/// Rectangles extend `length` along the local x axis (forward) and `width`
/// along local y.
#[derive(Debug, Clone, PartialEq)]
pub enum Contour {
    Circle { radius: f32 },
    Rectangle { width: f32, length: f32 },
    RegularPolygon { sides: u32, radius: f32 },
    /// Convex polygon, vertices counter-clockwise.
    Polygon { vertices: Vec<Vec2> },
}

impl Contour {
    pub fn circle(radius: f32) -> Result<Self, ConfigError> {
        Ok(Self::Circle {
            radius: positive(radius, "radius")?,
        })
    }

    pub fn rectangle(width: f32, length: f32) -> Result<Self, ConfigError> {
        Ok(Self::Rectangle {
            width: positive(width, "width")?,
            length: positive(length, "length")?,
        })
    }

    pub fn regular_polygon(sides: u32, radius: f32) -> Result<Self, ConfigError> {
        if sides < 3 {
            return Err(ConfigError::InvalidContour(format!(
                "regular polygon needs at least 3 sides, got {sides}"
            )));
        }
        Ok(Self::RegularPolygon {
            sides,
            radius: positive(radius, "radius")?,
        })
    }

    /// Convex polygon. Clockwise input is reversed.
    pub fn polygon(mut vertices: Vec<Vec2>) -> Result<Self, ConfigError> {
        if vertices.len() < 3 {
            return Err(ConfigError::InvalidContour(
                "polygon needs at least 3 vertices".into(),
            ));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(ConfigError::InvalidContour("non-finite vertex".into()));
        }
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        let n = vertices.len();
        let convex = (0..n).all(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            cross(b - a, c - b) >= 0.0
        });
        if !convex || signed_area(&vertices) <= f32::EPSILON {
            return Err(ConfigError::InvalidContour(
                "polygon must be convex with non-zero area".into(),
            ));
        }
        Ok(Self::Polygon { vertices })
    }

    pub fn from_config(config: &ContourConfig) -> Result<Self, ConfigError> {
        match config.shape {
            ShapeKind::Circle => Self::circle(require(config.radius, "circle", "radius")?),
            ShapeKind::Square => {
                let side = match (config.width, config.length, config.radius) {
                    (Some(w), _, _) | (None, Some(w), _) => w,
                    (None, None, Some(r)) => r * 2.0_f32.sqrt(),
                    _ => require(None, "square", "width")?,
                };
                Self::rectangle(side, side)
            }
            ShapeKind::Rectangle => Self::rectangle(
                require(config.width, "rectangle", "width")?,
                require(config.length, "rectangle", "length")?,
            ),
            ShapeKind::RegularPolygon => {
                let sides = config.sides.ok_or_else(|| {
                    ConfigError::InvalidContour("regular_polygon requires `sides`".into())
                })?;
                Self::regular_polygon(sides, require(config.radius, "regular_polygon", "radius")?)
            }
            ShapeKind::Polygon => {
                let vertices = config.vertices.as_ref().ok_or_else(|| {
                    ConfigError::InvalidContour("polygon requires `vertices`".into())
                })?;
                Self::polygon(vertices.iter().map(|v| Vec2::new(v[0], v[1])).collect())
            }
        }
    }

    /// Polygon outline, counter-clockwise. Empty for circles.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            Self::Circle { .. } => Vec::new(),
            Self::Rectangle { width, length } => {
                let (hx, hy) = (length / 2.0, width / 2.0);
                vec![
                    Vec2::new(-hx, -hy),
                    Vec2::new(hx, -hy),
                    Vec2::new(hx, hy),
                    Vec2::new(-hx, hy),
                ]
            }
            Self::RegularPolygon { sides, radius } => (0..*sides)
                .map(|k| {
                    let a = 2.0 * PI * k as f32 / *sides as f32;
                    Vec2::new(radius * a.cos(), radius * a.sin())
                })
                .collect(),
            Self::Polygon { vertices } => vertices.clone(),
        }
    }

    /// Radius of the smallest origin-centred circle enclosing the shape.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Circle { radius } | Self::RegularPolygon { radius, .. } => *radius,
            Self::Rectangle { width, length } => width.hypot(*length) / 2.0,
            Self::Polygon { vertices } => vertices.iter().map(|v| v.norm()).fold(0.0, f32::max),
        }
    }

    #[must_use]
    pub fn area(&self) -> f32 {
        match self {
            Self::Circle { radius } => PI * radius * radius,
            Self::Rectangle { width, length } => width * length,
            _ => signed_area(&self.vertices()).abs(),
        }
    }

    /// Moment of inertia about the origin for a uniform body of `mass`.
    #[must_use]
    pub fn moment_of_inertia(&self, mass: f32) -> f32 {
        match self {
            Self::Circle { radius } => mass * radius * radius / 2.0,
            Self::Rectangle { width, length } => mass * (width * width + length * length) / 12.0,
            _ => {
                let v = self.vertices();
                let n = v.len();
                let (mut num, mut den) = (0.0, 0.0);
                for i in 0..n {
                    let (a, b) = (v[i], v[(i + 1) % n]);
                    let c = cross(a, b).abs();
                    num += c * (a.dot(&a) + a.dot(&b) + b.dot(&b));
                    den += c;
                }
                mass * num / (6.0 * den)
            }
        }
    }

    /// Point containment in the contour's local frame (boundary included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Circle { radius } => point.norm() <= *radius,
            _ => {
                let v = self.vertices();
                let n = v.len();
                (0..n).all(|i| cross(v[(i + 1) % n] - v[i], point - v[i]) >= -1e-6)
            }
        }
    }

    /// Same shape grown outward by `margin`. Used for interaction halos.
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        match self {
            Self::Circle { radius } => Self::Circle {
                radius: radius + margin,
            },
            Self::Rectangle { width, length } => Self::Rectangle {
                width: width + 2.0 * margin,
                length: length + 2.0 * margin,
            },
            Self::RegularPolygon { sides, radius } => Self::RegularPolygon {
                sides: *sides,
                radius: radius + margin,
            },
            Self::Polygon { .. } => {
                let r = self.bounding_radius();
                self.scaled((r + margin) / r)
            }
        }
    }

    /// Uniformly scaled copy.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        match self {
            Self::Circle { radius } => Self::Circle {
                radius: radius * factor,
            },
            Self::Rectangle { width, length } => Self::Rectangle {
                width: width * factor,
                length: length * factor,
            },
            Self::RegularPolygon { sides, radius } => Self::RegularPolygon {
                sides: *sides,
                radius: radius * factor,
            },
            Self::Polygon { vertices } => Self::Polygon {
                vertices: vertices.iter().map(|v| v * factor).collect(),
            },
        }
    }

    /// Rasterised occupancy grid at one cell per unit, centred on the origin.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn mask(&self) -> Mask {
        let half = self.bounding_radius().ceil() as usize;
        let size = 2 * half + 1;
        let mut cells = vec![false; size * size];
        for row in 0..size {
            for col in 0..size {
                let p = Vec2::new(col as f32 - half as f32, half as f32 - row as f32);
                cells[row * size + col] = self.contains(p);
            }
        }
        Mask { size, cells }
    }
}

/// Square boolean grid, row-major, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub size: usize,
    pub cells: Vec<bool>,
}

impl Mask {
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row * self.size + col]
    }

    #[must_use]
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| cross(vertices[i], vertices[(i + 1) % n]))
        .sum::<f32>()
        / 2.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_without_length_is_config_error() {
        let cfg = ContourConfig {
            length: None,
            ..ContourConfig::rectangle(10.0, 20.0)
        };
        let err = Contour::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContour(ref m) if m.contains("length")));
    }

    #[test]
    fn circle_without_radius_is_config_error() {
        let cfg = ContourConfig {
            radius: None,
            ..ContourConfig::circle(1.0)
        };
        assert!(Contour::from_config(&cfg).is_err());
    }

    #[test]
    fn negative_radius_rejected() {
        assert!(Contour::circle(-2.0).is_err());
        assert!(Contour::circle(f32::NAN).is_err());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let v = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(Contour::polygon(v).is_err());
    }

    #[test]
    fn concave_polygon_rejected() {
        let v = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 4.0),
        ];
        assert!(Contour::polygon(v).is_err());
    }

    #[test]
    fn clockwise_polygon_is_reordered() {
        let v = vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, -1.0),
        ];
        let c = Contour::polygon(v).unwrap();
        assert!(signed_area(&c.vertices()) > 0.0);
        assert_relative_eq!(c.area(), 4.0);
    }

    #[test]
    fn square_from_radius() {
        let cfg = ContourConfig {
            shape: ShapeKind::Square,
            ..ContourConfig::circle(2.0_f32.sqrt())
        };
        let c = Contour::from_config(&cfg).unwrap();
        assert_relative_eq!(c.area(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn bounding_radius_per_kind() {
        assert_relative_eq!(Contour::circle(3.0).unwrap().bounding_radius(), 3.0);
        assert_relative_eq!(
            Contour::rectangle(6.0, 8.0).unwrap().bounding_radius(),
            5.0
        );
        assert_relative_eq!(
            Contour::regular_polygon(6, 2.0).unwrap().bounding_radius(),
            2.0
        );
    }

    #[test]
    fn regular_polygon_area_approaches_circle() {
        let poly = Contour::regular_polygon(256, 1.0).unwrap();
        assert_relative_eq!(poly.area(), PI, epsilon = 1e-3);
    }

    #[test]
    fn polygon_inertia_matches_rectangle_formula() {
        let rect = Contour::rectangle(2.0, 4.0).unwrap();
        let poly = Contour::polygon(rect.vertices()).unwrap();
        assert_relative_eq!(
            poly.moment_of_inertia(3.0),
            rect.moment_of_inertia(3.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn contains_respects_orientation() {
        let rect = Contour::rectangle(2.0, 10.0).unwrap();
        assert!(rect.contains(Vec2::new(4.5, 0.0)));
        assert!(!rect.contains(Vec2::new(0.0, 4.5)));
    }

    #[test]
    fn inflated_grows_bounding_radius() {
        for c in [
            Contour::circle(5.0).unwrap(),
            Contour::regular_polygon(5, 5.0).unwrap(),
            Contour::polygon(Contour::rectangle(4.0, 4.0).unwrap().vertices()).unwrap(),
        ] {
            let r = c.bounding_radius();
            assert_relative_eq!(c.inflated(2.0).bounding_radius(), r + 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn scaled_area_is_quadratic() {
        let c = Contour::rectangle(3.0, 5.0).unwrap();
        assert_relative_eq!(c.scaled(0.5).area(), c.area() * 0.25, epsilon = 1e-5);
    }

    #[test]
    fn circle_mask_is_symmetric() {
        let mask = Contour::circle(4.0).unwrap().mask();
        assert_eq!(mask.size, 9);
        assert!(mask.get(4, 4));
        assert!(!mask.get(0, 0));
        assert_eq!(mask.get(0, 4), mask.get(8, 4));
        assert_eq!(mask.get(4, 0), mask.get(4, 8));
        let expected = PI * 16.0;
        #[allow(clippy::cast_precision_loss)]
        let filled = mask.filled() as f32;
        assert!((filled - expected).abs() < expected * 0.25);
    }
}
