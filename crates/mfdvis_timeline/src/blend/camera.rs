// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera pose blending.

use crate::interpolation::{vec3, Interpolation};
use crate::snapshot::CameraSnapshot;

/// Blend two camera poses.
///
/// The eye is rebuilt from the blended target, a blended viewing direction
/// (normalized lerp of the two unit offsets) and a blended distance. This is
/// not a great-circle interpolation; eased progress keeps the motion smooth
/// for the short arcs between authored camera cuts.
pub fn blend_camera(start: &CameraSnapshot, end: &CameraSnapshot, t: f32) -> CameraSnapshot {
    if t <= 0.0 {
        return *start;
    }
    if t >= 1.0 {
        return *end;
    }

    let start_offset = vec3::sub(start.position, start.target);
    let end_offset = vec3::sub(end.position, end.target);

    let direction = match (vec3::normalize(start_offset), vec3::normalize(end_offset)) {
        (Some(a), Some(b)) => vec3::normalize(Interpolation::lerp_vec3(a, b, t))
            // Opposite directions cancel out at the midpoint
            .unwrap_or(if t < 0.5 { a } else { b }),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => [0.0, 0.0, 0.0],
    };

    let distance = Interpolation::lerp(vec3::length(start_offset), vec3::length(end_offset), t);
    let target = Interpolation::lerp_vec3(start.target, end.target, t);

    CameraSnapshot {
        position: vec3::add(target, vec3::scale(direction, distance)),
        target,
        roll: Interpolation::lerp(start.roll, end.roll, t),
        fov: Interpolation::lerp(start.fov, end.fov, t),
        projection: start.projection,
        interaction: start.interaction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ProjectionMode;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-4)
    }

    #[test]
    fn test_endpoints_are_exact() {
        let a = CameraSnapshot::looking_at([10.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let b = CameraSnapshot::looking_at([0.0, 5.0, 0.0], [1.0, 1.0, 1.0]);
        assert_eq!(blend_camera(&a, &b, 0.0), a);
        assert_eq!(blend_camera(&a, &b, 1.0), b);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let a = CameraSnapshot::looking_at([10.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let b = CameraSnapshot::looking_at([0.0, 10.0, 0.0], [0.0, 0.0, 0.0]);
        let mid = blend_camera(&a, &b, 0.5);

        let expected = 10.0 / 2.0_f32.sqrt();
        assert!(close(mid.position, [expected, expected, 0.0]));
        assert!((vec3::length(mid.position) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_target_distance_roll_fov_interpolate() {
        let mut a = CameraSnapshot::looking_at([0.0, 0.0, 4.0], [0.0, 0.0, 0.0]);
        a.roll = 0.0;
        a.fov = 30.0;
        let mut b = CameraSnapshot::looking_at([2.0, 0.0, 8.0], [2.0, 0.0, 0.0]);
        b.roll = 90.0;
        b.fov = 60.0;

        let mid = blend_camera(&a, &b, 0.25);
        assert!(close(mid.target, [0.5, 0.0, 0.0]));
        assert!(close(mid.position, [0.5, 0.0, 5.0]));
        assert!((mid.roll - 22.5).abs() < 1e-5);
        assert!((mid.fov - 37.5).abs() < 1e-5);
    }

    #[test]
    fn test_opposite_directions_do_not_collapse() {
        let a = CameraSnapshot::looking_at([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
        let b = CameraSnapshot::looking_at([0.0, 0.0, -5.0], [0.0, 0.0, 0.0]);
        let mid = blend_camera(&a, &b, 0.5);
        assert!((vec3::length(mid.position) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_switches_at_end() {
        let a = CameraSnapshot::default();
        let b = CameraSnapshot {
            projection: ProjectionMode::Orthographic,
            ..CameraSnapshot::default()
        };
        assert_eq!(blend_camera(&a, &b, 0.99).projection, ProjectionMode::Perspective);
        assert_eq!(blend_camera(&a, &b, 1.0).projection, ProjectionMode::Orthographic);
    }
}
