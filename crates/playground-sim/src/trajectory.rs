//! Precomputed paths for kinematic elements.

use std::f32::consts::TAU;

use playground_core::{ConfigError, Coordinates, Vec2};
use serde::{Deserialize, Serialize};

const fn default_points_per_loop() -> usize {
    100
}

/// Serialised form of a [`Trajectory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum TrajectoryConfig {
    /// Closed polyline through `waypoints`, resampled to `points_per_loop`
    /// evenly spaced points.
    Waypoints {
        waypoints: Vec<[f32; 2]>,
        #[serde(default = "default_points_per_loop")]
        points_per_loop: usize,
    },
    /// Circle travelled at `angular_speed` radians per tick.
    Circle {
        center: [f32; 2],
        radius: f32,
        angular_speed: f32,
        #[serde(default)]
        phase: f32,
    },
}

/// A looping sequence of poses. Each call to [`next`](Self::next) advances
/// one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<Coordinates>,
    index: usize,
}

impl Trajectory {
    pub fn waypoints(waypoints: &[Vec2], points_per_loop: usize) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::invalid("waypoints", "need at least 2 points"));
        }
        if points_per_loop == 0 {
            return Err(ConfigError::invalid("points_per_loop", "must be > 0"));
        }
        let segments: Vec<(Vec2, Vec2)> = waypoints
            .iter()
            .zip(waypoints.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b))
            .collect();
        let total: f32 = segments.iter().map(|(a, b)| (b - a).norm()).sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(ConfigError::invalid("waypoints", "path has zero length"));
        }

        #[allow(clippy::cast_precision_loss)]
        let spacing = total / points_per_loop as f32;
        let mut points = Vec::with_capacity(points_per_loop);
        let mut segment = 0;
        let mut walked = 0.0;
        for i in 0..points_per_loop {
            #[allow(clippy::cast_precision_loss)]
            let target = i as f32 * spacing;
            loop {
                let (a, b) = segments[segment];
                let len = (b - a).norm();
                if target <= walked + len || segment + 1 == segments.len() {
                    let t = if len > 0.0 { ((target - walked) / len).clamp(0.0, 1.0) } else { 0.0 };
                    points.push(Coordinates::new(a + (b - a) * t, 0.0));
                    break;
                }
                walked += len;
                segment += 1;
            }
        }
        Ok(Self { points, index: 0 })
    }

    pub fn circle(center: Vec2, radius: f32, angular_speed: f32, phase: f32) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::invalid("radius", "must be finite and > 0"));
        }
        if !(angular_speed.is_finite() && angular_speed != 0.0) {
            return Err(ConfigError::invalid("angular_speed", "must be finite and non-zero"));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (TAU / angular_speed.abs()).round().max(1.0) as usize;
        let points = (0..count)
            .map(|k| {
                #[allow(clippy::cast_precision_loss)]
                let theta = phase + angular_speed * k as f32;
                Coordinates::new(
                    center + Vec2::new(theta.cos(), theta.sin()) * radius,
                    theta,
                )
            })
            .collect();
        Ok(Self { points, index: 0 })
    }

    pub fn from_config(config: &TrajectoryConfig) -> Result<Self, ConfigError> {
        match config {
            TrajectoryConfig::Waypoints {
                waypoints,
                points_per_loop,
            } => {
                let pts: Vec<Vec2> = waypoints.iter().map(|p| Vec2::new(p[0], p[1])).collect();
                Self::waypoints(&pts, *points_per_loop)
            }
            TrajectoryConfig::Circle {
                center,
                radius,
                angular_speed,
                phase,
            } => Self::circle(Vec2::new(center[0], center[1]), *radius, *angular_speed, *phase),
        }
    }

    /// Pose at the current index.
    #[must_use]
    pub fn current(&self) -> Coordinates {
        self.points[self.index]
    }

    /// Advance one tick and return the new pose.
    pub fn next(&mut self) -> Coordinates {
        self.index = (self.index + 1) % self.points.len();
        self.current()
    }

    /// Back to the first point.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn waypoints_are_evenly_resampled() {
        let t = Trajectory::waypoints(&square(), 8).unwrap();
        assert_eq!(t.len(), 8);
        let expected = [
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (10.0, 10.0),
            (5.0, 10.0),
            (0.0, 10.0),
            (0.0, 5.0),
        ];
        for (i, (x, y)) in expected.iter().enumerate() {
            let p = t.points[i].position;
            assert_relative_eq!(p.x, *x, epsilon = 1e-4);
            assert_relative_eq!(p.y, *y, epsilon = 1e-4);
        }
    }

    #[test]
    fn next_loops_and_reset_restarts() {
        let mut t = Trajectory::waypoints(&square(), 4).unwrap();
        let start = t.current();
        for _ in 0..4 {
            t.next();
        }
        assert_eq!(t.current(), start);
        t.next();
        assert_ne!(t.current(), start);
        t.reset();
        assert_eq!(t.current(), start);
    }

    #[test]
    fn circle_keeps_radius() {
        let mut t = Trajectory::circle(Vec2::new(50.0, 50.0), 20.0, 0.1, 0.0).unwrap();
        assert_eq!(t.len(), 63);
        for _ in 0..100 {
            let p = t.next().position;
            assert_relative_eq!((p - Vec2::new(50.0, 50.0)).norm(), 20.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn degenerate_paths_rejected() {
        assert!(Trajectory::waypoints(&[Vec2::zeros()], 10).is_err());
        assert!(Trajectory::waypoints(&[Vec2::zeros(), Vec2::zeros()], 10).is_err());
        assert!(Trajectory::waypoints(&square(), 0).is_err());
        assert!(Trajectory::circle(Vec2::zeros(), 10.0, 0.0, 0.0).is_err());
        assert!(Trajectory::circle(Vec2::zeros(), -1.0, 0.1, 0.0).is_err());
    }

    #[test]
    fn builds_from_toml() {
        let cfg: TrajectoryConfig = toml::from_str(
            r#"
            path = "waypoints"
            waypoints = [[0.0, 0.0], [20.0, 0.0]]
            points_per_loop = 10
            "#,
        )
        .unwrap();
        let t = Trajectory::from_config(&cfg).unwrap();
        assert_eq!(t.len(), 10);
        assert_relative_eq!(t.points[5].position.x, 20.0, epsilon = 1e-4);
    }
}
