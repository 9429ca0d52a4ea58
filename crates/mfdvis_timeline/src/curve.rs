// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition easing curves.
//!
//! A transition is described by a [`TransitionSpec`]: either one of the three
//! step kinds, or a five point curve that is refined by corner subdivision and
//! evaluated with a local Catmull-Rom spline. Evaluation is a pure function of
//! the transition and the raw progress.

use crate::interpolation::Interpolation;
use serde::{Deserialize, Serialize};

/// Number of corner-subdivision rounds applied before evaluation
const SUBDIVISION_ROUNDS: usize = 3;

/// How a transition maps raw progress to eased progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Jump to the end state at the first instant of the transition
    InstantAtStart,
    /// Jump to the end state halfway through
    InstantAtMiddle,
    /// Jump to the end state when the transition completes
    InstantAtEnd,
    /// Diagonal curve
    #[default]
    Linear,
    /// Symmetric S-curve
    Smooth,
    /// User-authored curve
    Custom,
}

impl TransitionKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstantAtStart => "Instant (start)",
            Self::InstantAtMiddle => "Instant (middle)",
            Self::InstantAtEnd => "Instant (end)",
            Self::Linear => "Linear",
            Self::Smooth => "Smooth",
            Self::Custom => "Custom",
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [TransitionKind] {
        &[
            Self::InstantAtStart,
            Self::InstantAtMiddle,
            Self::InstantAtEnd,
            Self::Linear,
            Self::Smooth,
            Self::Custom,
        ]
    }
}

/// Named default control-point layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurvePreset {
    /// Straight diagonal
    Linear,
    /// Symmetric S-shape
    Smooth,
    /// Most of the change happens early
    EaseStart,
    /// Most of the change happens around the midpoint
    EaseMiddle,
    /// Most of the change happens late
    EaseEnd,
}

impl CurvePreset {
    /// Control points for this preset
    pub fn curve(self) -> EasingCurve {
        let points = match self {
            Self::Linear => [[0.0, 0.0], [0.25, 0.25], [0.5, 0.5], [0.75, 0.75], [1.0, 1.0]],
            Self::Smooth => [[0.0, 0.0], [0.25, 0.1], [0.5, 0.5], [0.75, 0.9], [1.0, 1.0]],
            Self::EaseStart => [[0.0, 0.0], [0.1, 0.6], [0.5, 0.9], [0.75, 0.97], [1.0, 1.0]],
            Self::EaseMiddle => [[0.0, 0.0], [0.4, 0.05], [0.5, 0.5], [0.6, 0.95], [1.0, 1.0]],
            Self::EaseEnd => [[0.0, 0.0], [0.25, 0.03], [0.5, 0.1], [0.9, 0.4], [1.0, 1.0]],
        };
        EasingCurve { points }
    }

    /// Get all presets
    pub fn all() -> &'static [CurvePreset] {
        &[
            Self::Linear,
            Self::Smooth,
            Self::EaseStart,
            Self::EaseMiddle,
            Self::EaseEnd,
        ]
    }
}

/// Five control points describing an easing curve.
///
/// The x coordinates are pinned at 0, 0.5 and 1 for the first, middle and
/// last point; the second point lies in `[0, 0.5]` and the fourth in
/// `[0.5, 1]`. Every y lies in `[0, 1]`. Construction and deserialization
/// clamp into these ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f32; 2]; 5]", into = "[[f32; 2]; 5]")]
pub struct EasingCurve {
    points: [[f32; 2]; 5],
}

impl EasingCurve {
    /// Create a curve, clamping the points into their valid ranges
    pub fn new(points: [[f32; 2]; 5]) -> Self {
        let mut curve = Self { points };
        curve.normalize();
        curve
    }

    /// Control points
    pub fn points(&self) -> &[[f32; 2]; 5] {
        &self.points
    }

    /// Move a control point, keeping the curve valid
    pub fn set_point(&mut self, index: usize, point: [f32; 2]) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
            self.normalize();
        }
    }

    /// Re-enforce the control-point ranges
    pub fn normalize(&mut self) {
        let p = &mut self.points;
        p[0][0] = 0.0;
        p[1][0] = Interpolation::clamp(p[1][0], 0.0, 0.5);
        p[2][0] = 0.5;
        p[3][0] = Interpolation::clamp(p[3][0], 0.5, 1.0);
        p[4][0] = 1.0;
        for point in p.iter_mut() {
            point[1] = Interpolation::unit(point[1]);
        }
    }

    /// Dense polyline obtained by corner subdivision.
    ///
    /// Each round replaces every segment with its 1/4 and 3/4 points while
    /// keeping the two curve endpoints, so the result stays anchored at x = 0
    /// and x = 1 and remains non-decreasing in x.
    pub fn refined(&self) -> Vec<[f32; 2]> {
        let mut points = self.points.to_vec();

        for _ in 0..SUBDIVISION_ROUNDS {
            let first = points[0];
            let last = points[points.len() - 1];
            let mut next = Vec::with_capacity(points.len() * 2);

            next.push(first);
            for pair in points.windows(2) {
                next.push(mix(pair[0], pair[1], 0.25));
                next.push(mix(pair[0], pair[1], 0.75));
            }
            next.push(last);

            points = next;
        }

        points
    }

    /// Evaluate the curve at `x`.
    ///
    /// The endpoints return the first and last control point's y even when
    /// other points share their x.
    pub fn sample(&self, x: f32) -> f32 {
        let x = Interpolation::unit(x);
        let points = self.refined();
        let last = points.len() - 1;

        if x <= points[0][0] {
            return points[0][1];
        }
        if x >= points[last][0] {
            return points[last][1];
        }

        let segment = points
            .windows(2)
            .position(|pair| x <= pair[1][0])
            .unwrap_or(last - 1);
        let start = points[segment];
        let end = points[segment + 1];

        let width = end[0] - start[0];
        let u = if width <= f32::EPSILON {
            1.0
        } else {
            (x - start[0]) / width
        };

        // Exact at the polyline vertices
        if u <= 0.0 {
            return start[1];
        }
        if u >= 1.0 {
            return end[1];
        }

        let before = points[segment.saturating_sub(1)][1];
        let after = points[(segment + 2).min(last)][1];
        Interpolation::unit(Interpolation::catmull_rom(before, start[1], end[1], after, u))
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        CurvePreset::Linear.curve()
    }
}

impl From<[[f32; 2]; 5]> for EasingCurve {
    fn from(points: [[f32; 2]; 5]) -> Self {
        Self::new(points)
    }
}

impl From<EasingCurve> for [[f32; 2]; 5] {
    fn from(curve: EasingCurve) -> Self {
        curve.points
    }
}

fn mix(a: [f32; 2], b: [f32; 2], weight: f32) -> [f32; 2] {
    [
        Interpolation::lerp(a[0], b[0], weight),
        Interpolation::lerp(a[1], b[1], weight),
    ]
}

/// Transition specification for one animated property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TransitionSpec {
    /// Transition kind
    pub kind: TransitionKind,
    /// Explicit curve; presets are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<EasingCurve>,
}

impl TransitionSpec {
    /// Create a spec of the given kind with its default curve
    pub fn new(kind: TransitionKind) -> Self {
        Self { kind, curve: None }
    }

    /// Linear transition
    pub fn linear() -> Self {
        Self::new(TransitionKind::Linear)
    }

    /// Smooth transition
    pub fn smooth() -> Self {
        Self::new(TransitionKind::Smooth)
    }

    /// Custom transition with a user curve
    pub fn custom(curve: EasingCurve) -> Self {
        Self {
            kind: TransitionKind::Custom,
            curve: Some(curve),
        }
    }

    /// Set the curve
    pub fn with_curve(mut self, curve: EasingCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Curve used for evaluation, falling back to the kind's preset
    pub fn effective_curve(&self) -> EasingCurve {
        self.curve.unwrap_or_else(|| match self.kind {
            TransitionKind::Smooth => CurvePreset::Smooth.curve(),
            _ => CurvePreset::Linear.curve(),
        })
    }

    /// Re-enforce curve ranges
    pub fn normalize(&mut self) {
        if let Some(curve) = &mut self.curve {
            curve.normalize();
        }
    }

    /// Map raw progress to eased progress
    pub fn ease(&self, progress: f32) -> f32 {
        ease(self, progress)
    }
}

/// Curve evaluator: eased progress for `raw` progress under `spec`.
///
/// `raw` is clamped into `[0, 1]`. Step kinds return exactly 0 or 1.
pub fn ease(spec: &TransitionSpec, raw: f32) -> f32 {
    let r = Interpolation::unit(raw);

    match spec.kind {
        TransitionKind::InstantAtStart => step(r > 0.0),
        TransitionKind::InstantAtMiddle => step(r >= 0.5),
        TransitionKind::InstantAtEnd => step(r >= 1.0),
        TransitionKind::Linear | TransitionKind::Smooth | TransitionKind::Custom => {
            spec.effective_curve().sample(r)
        }
    }
}

fn step(fired: bool) -> f32 {
    if fired {
        1.0
    } else {
        0.0
    }
}
