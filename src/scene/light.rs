// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::Vec3;

use super::transform::Transform;
use crate::constants::{DEFAULT_LIGHT_INTENSITY, DEFAULT_LIGHT_ROTATION};

/// Sun-style light: only the orientation of its transform matters.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub transform: Transform,
    intensity: f32,
    intensity_changed: bool,
}

impl DirectionalLight {
    pub fn new(pitch: f32, yaw: f32, intensity: f32) -> Self {
        Self {
            transform: Transform::from_pitch_yaw(Vec3::ZERO, pitch, yaw),
            intensity,
            intensity_changed: false,
        }
    }

    /// Direction the light travels in.
    pub fn direction(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// A different intensity changes what the kernel sees, so it counts as a light change.
    pub fn set_intensity(&mut self, intensity: f32) {
        if intensity != self.intensity {
            self.intensity = intensity;
            self.intensity_changed = true;
        }
    }

    /// One-shot: true after a move, rotation or intensity edit until cleared.
    pub fn has_changed(&self) -> bool {
        self.transform.has_changed() || self.intensity_changed
    }

    pub fn clear_changed(&mut self) {
        self.transform.clear_changed();
        self.intensity_changed = false;
    }

    /// `direction.xyz, intensity` as consumed by the kernel.
    pub fn to_vec4(&self) -> [f32; 4] {
        let d = self.direction();
        [d.x, d.y, d.z, self.intensity]
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        let [pitch, yaw] = DEFAULT_LIGHT_ROTATION;
        Self::new(pitch, yaw, DEFAULT_LIGHT_INTENSITY)
    }
}
