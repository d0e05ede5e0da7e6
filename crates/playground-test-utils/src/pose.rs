//! Pose comparison helpers.

use playground_core::Coordinates;
use playground_core::types::wrap_angle;

/// Euclidean distance between positions plus wrapped angle difference.
pub fn pose_distance(a: &Coordinates, b: &Coordinates) -> (f32, f32) {
    (
        (a.position - b.position).norm(),
        wrap_angle(a.angle - b.angle).abs(),
    )
}

/// Panic unless `actual` is within `tolerance` of `expected` in both
/// position and angle.
#[track_caller]
pub fn assert_pose_near(actual: &Coordinates, expected: &Coordinates, tolerance: f32) {
    let (dp, da) = pose_distance(actual, expected);
    assert!(
        dp <= tolerance && da <= tolerance,
        "pose {actual:?} not within {tolerance} of {expected:?} (dp={dp}, da={da})"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_angles_compare_close() {
        let a = Coordinates::at(1.0, 1.0).with_angle(3.1);
        let b = Coordinates::at(1.0, 1.0).with_angle(-3.1);
        let (_, da) = pose_distance(&a, &b);
        assert!(da < 0.1);
        assert_pose_near(&a, &b, 0.1);
    }

    #[test]
    #[should_panic(expected = "not within")]
    fn far_poses_panic() {
        assert_pose_near(&Coordinates::at(0.0, 0.0), &Coordinates::at(5.0, 0.0), 1.0);
    }
}
