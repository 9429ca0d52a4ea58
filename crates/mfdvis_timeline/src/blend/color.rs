// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hue/saturation/lightness color blending.

use crate::interpolation::Interpolation;
use crate::snapshot::Color;

/// Saturation below which a color's hue is meaningless
const ACHROMATIC: f32 = 1e-5;

/// Color in HSL space; all components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue as a fraction of a full turn
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Lightness
    pub l: f32,
}

impl Hsl {
    /// Create from components
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Convert from RGB
    pub fn from_rgb(color: Color) -> Self {
        let [r, g, b] = color.0.map(Interpolation::unit);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max - min < f32::EPSILON {
            return Self { h: 0.0, s: 0.0, l };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self { h: h / 6.0, s, l }
    }

    /// Convert to RGB
    pub fn to_rgb(self) -> Color {
        let Self { h, s, l } = self;

        if s <= 0.0 {
            return Color([l, l, l]);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Color([
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        ])
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Interpolate hue along the shorter arc of the color wheel
pub fn blend_hue(from: f32, to: f32, t: f32) -> f32 {
    let mut delta = to - from;
    if delta > 0.5 {
        delta -= 1.0;
    } else if delta < -0.5 {
        delta += 1.0;
    }
    (from + delta * t).rem_euclid(1.0)
}

/// Blend two colors in HSL space with shortest-path hue
pub fn blend_color(from: Color, to: Color, t: f32) -> Color {
    let a = Hsl::from_rgb(from);
    let b = Hsl::from_rgb(to);

    // A gray has no hue of its own; borrow the other side's
    let (from_hue, to_hue) = match (a.s < ACHROMATIC, b.s < ACHROMATIC) {
        (true, false) => (b.h, b.h),
        (false, true) => (a.h, a.h),
        _ => (a.h, b.h),
    };

    Hsl {
        h: blend_hue(from_hue, to_hue, t),
        s: Interpolation::lerp(a.s, b.s, t),
        l: Interpolation::lerp(a.l, b.l, t),
    }
    .to_rgb()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(1.0);
        d.min(1.0 - d)
    }

    #[test]
    fn test_hue_wraps_across_zero() {
        let h = blend_hue(350.0 / 360.0, 10.0 / 360.0, 0.5);
        assert!(hue_distance(h, 0.0) < 1e-4, "got {}", h * 360.0);

        let back = blend_hue(10.0 / 360.0, 350.0 / 360.0, 0.5);
        assert!(hue_distance(back, 0.0) < 1e-4);
    }

    #[test]
    fn test_hue_short_arc_without_wrap() {
        let h = blend_hue(0.2, 0.4, 0.5);
        assert!((h - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_round_trip_primaries() {
        for color in [
            Color::rgb(1.0, 0.0, 0.0),
            Color::rgb(0.0, 1.0, 0.0),
            Color::rgb(0.0, 0.0, 1.0),
            Color::rgb(0.2, 0.6, 0.9),
        ] {
            let back = Hsl::from_rgb(color).to_rgb();
            for i in 0..3 {
                assert!((back.0[i] - color.0[i]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_blend_across_red_stays_red() {
        let from = Hsl::new(350.0 / 360.0, 1.0, 0.5).to_rgb();
        let to = Hsl::new(10.0 / 360.0, 1.0, 0.5).to_rgb();
        let mid = blend_color(from, to, 0.5);
        assert!((mid.0[0] - 1.0).abs() < 1e-4);
        assert!(mid.0[1] < 1e-3);
        assert!(mid.0[2] < 1e-3);
    }

    #[test]
    fn test_blend_from_gray_keeps_target_hue() {
        let mid = blend_color(Color::rgb(0.5, 0.5, 0.5), Color::rgb(0.0, 0.0, 1.0), 0.5);
        let hsl = Hsl::from_rgb(mid);
        assert!(hue_distance(hsl.h, 2.0 / 3.0) < 1e-4);
    }
}
