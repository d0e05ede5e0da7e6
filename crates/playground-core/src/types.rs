use std::collections::BTreeSet;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 2D vector in playground units (pixels).
pub type Vec2 = nalgebra::Vector2<f32>;

/// Rotate `v` counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Wrap an angle to `[-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Position and orientation of a body in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub position: Vec2,
    pub angle: f32,
}

impl Coordinates {
    #[must_use]
    pub const fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), 0.0)
    }

    #[must_use]
    pub const fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Transform a point expressed in this frame into world space.
    #[must_use]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.angle)
    }

    /// Express a world point in this frame.
    #[must_use]
    pub fn inverse_transform_point(&self, world: Vec2) -> Vec2 {
        rotate(world - self.position, -self.angle)
    }
}

/// Serializable form of [`Coordinates`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinatesConfig {
    pub position: [f32; 2],
    #[serde(default)]
    pub angle: f32,
}

impl From<CoordinatesConfig> for Coordinates {
    fn from(c: CoordinatesConfig) -> Self {
        Self::new(Vec2::new(c.position[0], c.position[1]), c.angle)
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Set of team tags.
///
/// Two entities interact unless both carry teams and share none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Teams(BTreeSet<String>);

impl Teams {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, team: &str) -> bool {
        self.0.contains(team)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether an interaction between owners of `self` and `other` is allowed.
    #[must_use]
    pub fn interacts_with(&self, other: &Self) -> bool {
        if self.0.is_empty() || other.0.is_empty() {
            return true;
        }
        !self.0.is_disjoint(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-7.0_f32, -PI, -1.0, 0.0, 1.0, PI, 4.0, 13.0] {
            let w = wrap_angle(raw);
            assert!((-PI..=PI).contains(&w), "{raw} -> {w}");
            assert_relative_eq!(w.sin(), raw.sin(), epsilon = 1e-4);
            assert_relative_eq!(w.cos(), raw.cos(), epsilon = 1e-4);
        }
    }

    #[test]
    fn coordinates_transform_roundtrip() {
        let frame = Coordinates::at(10.0, -5.0).with_angle(0.7);
        let local = Vec2::new(3.0, 2.0);
        let back = frame.inverse_transform_point(frame.transform_point(local));
        assert_relative_eq!(back.x, local.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, local.y, epsilon = 1e-5);
    }

    #[test]
    fn coordinates_from_config() {
        let c: Coordinates = CoordinatesConfig {
            position: [1.0, 2.0],
            angle: 0.5,
        }
        .into();
        assert_eq!(c.position, Vec2::new(1.0, 2.0));
        assert_eq!(c.angle, 0.5);
    }

    // -- Teams --

    #[test]
    fn empty_teams_interact_with_everyone() {
        let red = Teams::from_names(["red"]);
        assert!(Teams::none().interacts_with(&red));
        assert!(red.interacts_with(&Teams::none()));
        assert!(Teams::none().interacts_with(&Teams::none()));
    }

    #[test]
    fn disjoint_teams_do_not_interact() {
        let red = Teams::from_names(["red"]);
        let blue = Teams::from_names(["blue"]);
        assert!(!red.interacts_with(&blue));
    }

    #[test]
    fn overlapping_teams_interact() {
        let a = Teams::from_names(["red", "green"]);
        let b = Teams::from_names(["green", "blue"]);
        assert!(a.interacts_with(&b));
        assert!(a.contains("green"));
    }
}
