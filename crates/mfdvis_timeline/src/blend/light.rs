// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lighting blend with crossfades for lights that exist on one side only.

use super::color::blend_color;
use crate::interpolation::Interpolation;
use crate::snapshot::{AmbientLight, LightEntry, LightKind, LightSnapshot, SpotParams};

/// Blend two lighting configurations.
///
/// Lights are paired by index. A light present only in `end` fades in from
/// zero intensity; a light present only in `start` fades out and is dropped
/// once `t` reaches 1.
pub fn blend_lights(start: &LightSnapshot, end: &LightSnapshot, t: f32) -> LightSnapshot {
    if t <= 0.0 {
        return start.clone();
    }
    if t >= 1.0 {
        return end.clone();
    }

    let count = start.lights.len().max(end.lights.len());
    let lights = (0..count)
        .filter_map(|slot| match (start.lights.get(slot), end.lights.get(slot)) {
            (Some(a), Some(b)) => Some(blend_entry(a, b, t)),
            (None, Some(b)) => Some(LightEntry {
                intensity: b.intensity * t,
                ..*b
            }),
            (Some(a), None) => Some(LightEntry {
                intensity: a.intensity * (1.0 - t),
                ..*a
            }),
            (None, None) => None,
        })
        .collect();

    LightSnapshot {
        ambient: blend_ambient(&start.ambient, &end.ambient, t),
        lights,
    }
}

fn blend_ambient(a: &AmbientLight, b: &AmbientLight, t: f32) -> AmbientLight {
    AmbientLight {
        color: blend_color(a.color, b.color, t),
        intensity: Interpolation::lerp(a.intensity, b.intensity, t),
    }
}

fn blend_entry(a: &LightEntry, b: &LightEntry, t: f32) -> LightEntry {
    // The light type itself never interpolates; the target type is used
    let kind = match (a.kind, b.kind) {
        (LightKind::Spot(pa), LightKind::Spot(pb)) => LightKind::Spot(blend_spot(&pa, &pb, t)),
        (_, kind) => kind,
    };

    LightEntry {
        kind,
        color: blend_color(a.color, b.color, t),
        intensity: Interpolation::lerp(a.intensity, b.intensity, t),
        position: Interpolation::lerp_vec3(a.position, b.position, t),
        target: Interpolation::lerp_vec3(a.target, b.target, t),
    }
}

fn blend_spot(a: &SpotParams, b: &SpotParams, t: f32) -> SpotParams {
    SpotParams {
        distance: Interpolation::lerp(a.distance, b.distance, t),
        angle: Interpolation::lerp(a.angle, b.angle, t),
        penumbra: Interpolation::lerp(a.penumbra, b.penumbra, t),
        decay: Interpolation::lerp(a.decay, b.decay, t),
    }
}
