// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar and vector interpolation helpers shared by the curve evaluator and
//! the property blends.

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate Vec3
    pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }

    /// Uniform Catmull-Rom spline through `p1`..`p2`, shaped by `p0` and `p3`
    pub fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;

        0.5 * ((2.0 * p1)
            + (p2 - p0) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
    }

    /// Clamp into `[min, max]`, mapping NaN to `min`
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        }
    }

    /// Clamp into `[0, 1]`, mapping NaN to 0
    pub fn unit(value: f32) -> f32 {
        Self::clamp(value, 0.0, 1.0)
    }

    /// Clamp a duration to a finite non-negative value
    pub fn duration(value: f32) -> f32 {
        if value.is_finite() {
            value.max(0.0)
        } else {
            0.0
        }
    }
}

/// Vector helpers for `[f32; 3]`
pub(crate) mod vec3 {
    pub fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    pub fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    pub fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
        [a[0] * s, a[1] * s, a[2] * s]
    }

    pub fn length(a: [f32; 3]) -> f32 {
        (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
    }

    /// Unit vector, or `None` for a zero-length input
    pub fn normalize(a: [f32; 3]) -> Option<[f32; 3]> {
        let len = length(a);
        if len > f32::EPSILON {
            Some(scale(a, 1.0 / len))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catmull_rom_passes_through_control_points() {
        assert_eq!(Interpolation::catmull_rom(0.0, 0.2, 0.8, 1.0, 0.0), 0.2);
        assert!((Interpolation::catmull_rom(0.0, 0.2, 0.8, 1.0, 1.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_handles_nan() {
        assert_eq!(Interpolation::unit(f32::NAN), 0.0);
        assert_eq!(Interpolation::unit(2.0), 1.0);
        assert_eq!(Interpolation::duration(-3.0), 0.0);
        assert_eq!(Interpolation::duration(f32::INFINITY), 0.0);
    }
}
