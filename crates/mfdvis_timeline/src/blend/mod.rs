// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property interpolators.
//!
//! Each blend takes a start snapshot, an end snapshot and an eased progress
//! `t`, and returns the resolved state. All three return the start state
//! exactly at `t <= 0` and the end state exactly at `t >= 1`.

pub mod camera;
pub mod color;
pub mod light;
pub mod visibility;

pub use camera::blend_camera;
pub use color::{blend_color, blend_hue, Hsl};
pub use light::blend_lights;
pub use visibility::{blend_visibility, ModelAppearance, ModelVisibilityFrame};
