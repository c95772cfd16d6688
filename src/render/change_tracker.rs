// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::camera::Camera;
use crate::scene::light::DirectionalLight;

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Accumulation must restart when any input says so.
pub fn should_reset(
    camera_moved: bool,
    light_moved: bool,
    any_object_changed: bool,
    viewport_changed: bool,
) -> bool {
    camera_moved || light_moved || any_object_changed || viewport_changed
}

/// The four change sources observed for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSignals {
    pub camera_moved: bool,
    pub light_moved: bool,
    pub objects_changed: bool,
    pub viewport_changed: bool,
}

impl ChangeSignals {
    pub fn should_reset(&self) -> bool {
        should_reset(
            self.camera_moved,
            self.light_moved,
            self.objects_changed,
            self.viewport_changed,
        )
    }
}

/// Remembers the last consumed field of view and viewport so changes can be detected.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    last_fov: Option<f32>,
    last_viewport: Option<Viewport>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this frame's signals. Nothing is cleared here.
    pub fn observe(
        &self,
        camera: &Camera,
        light: &DirectionalLight,
        viewport: Viewport,
        any_object_changed: bool,
    ) -> ChangeSignals {
        ChangeSignals {
            camera_moved: camera.transform.has_changed(),
            light_moved: light.has_changed(),
            objects_changed: any_object_changed,
            viewport_changed: self.last_fov != Some(camera.fov)
                || self.last_viewport != Some(viewport),
        }
    }

    /// Acknowledge the frame's signals: clear one-shot flags and remember the current view.
    ///
    /// Runs every frame after the reset decision, so a single change never resets twice.
    pub fn consume(&mut self, camera: &mut Camera, light: &mut DirectionalLight, viewport: Viewport) {
        camera.transform.clear_changed();
        light.clear_changed();
        self.last_fov = Some(camera.fov);
        self.last_viewport = Some(viewport);
    }
}
