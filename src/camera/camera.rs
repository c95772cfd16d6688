// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::{Mat4, Vec3};

use crate::constants::{DEFAULT_CAMERA_POSITION, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_NEAR};
use crate::scene::scene::CameraConfig;
use crate::scene::transform::Transform;

/// Pinhole camera looking down its local -Z axis.
#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, pitch: f32, yaw: f32, fov: f32) -> Self {
        Self {
            transform: Transform::from_pitch_yaw(position, pitch, yaw),
            fov,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            config.position.into(),
            config.rotation[0],
            config.rotation[1],
            config.fov,
        )
    }

    pub fn camera_to_world(&self) -> Mat4 {
        self.transform.local_to_world()
    }

    pub fn projection(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width as f32 / height.max(1) as f32;
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn inverse_projection(&self, width: u32, height: u32) -> Mat4 {
        self.projection(width, height).inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::from(DEFAULT_CAMERA_POSITION), 0.0, 0.0, DEFAULT_FOV)
    }
}
