// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::light::DirectionalLight;
use super::material::Material;
use super::object::SceneObject;
use crate::constants::{
    DEFAULT_CAMERA_POSITION, DEFAULT_ENVIRONMENT_INTENSITY, DEFAULT_FOV, DEFAULT_FRAMES,
    DEFAULT_JITTER_RANGE, DEFAULT_LIGHT_INTENSITY, DEFAULT_LIGHT_ROTATION, DEFAULT_MAX_BOUNCES,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],

    /// Pitch and yaw in degrees.
    #[serde(default)]
    pub rotation: [f32; 2],

    #[serde(default = "default_fov")]
    pub fov: f32,
}

fn default_camera_position() -> [f32; 3] {
    DEFAULT_CAMERA_POSITION
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            rotation: [0.0, 0.0],
            fov: default_fov(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// Pitch and yaw in degrees.
    #[serde(default = "default_light_rotation")]
    pub rotation: [f32; 2],

    #[serde(default = "default_light_intensity")]
    pub intensity: f32,
}

fn default_light_rotation() -> [f32; 2] {
    DEFAULT_LIGHT_ROTATION
}

fn default_light_intensity() -> f32 {
    DEFAULT_LIGHT_INTENSITY
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            rotation: default_light_rotation(),
            intensity: default_light_intensity(),
        }
    }
}

impl LightConfig {
    pub fn to_light(&self) -> DirectionalLight {
        DirectionalLight::new(self.rotation[0], self.rotation[1], self.intensity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub position: [f32; 3],

    #[serde(default = "default_radius")]
    pub radius: f32,

    #[serde(default, skip_serializing_if = "Material::is_default")]
    pub material: Material,
}

fn default_radius() -> f32 {
    1.0
}

impl SphereConfig {
    pub fn to_object(&self) -> SceneObject {
        let object = SceneObject::sphere(self.position.into(), self.radius, self.material);
        match &self.name {
            Some(name) => object.with_name(name.clone()),
            None => object,
        }
    }
}

/// Equirectangular environment map sampled for rays that escape the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub path: String,

    #[serde(default = "default_environment_intensity")]
    pub intensity: f32,
}

fn default_environment_intensity() -> f32 {
    DEFAULT_ENVIRONMENT_INTENSITY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Number of samples to accumulate before saving.
    #[serde(default = "default_frames")]
    pub frames: u32,

    /// Range each sub-pixel jitter component is drawn from.
    #[serde(default = "default_jitter_range")]
    pub jitter_range: [f32; 2],

    #[serde(default = "default_max_bounces")]
    pub max_bounces: u32,

    /// Fixed RNG seed for reproducible renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

fn default_width() -> u32 {
    DEFAULT_VIEWPORT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_VIEWPORT_HEIGHT
}

fn default_frames() -> u32 {
    DEFAULT_FRAMES
}

fn default_jitter_range() -> [f32; 2] {
    DEFAULT_JITTER_RANGE
}

fn default_max_bounces() -> u32 {
    DEFAULT_MAX_BOUNCES
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frames: default_frames(),
            jitter_range: default_jitter_range(),
            max_bounces: default_max_bounces(),
            seed: None,
            output: None,
        }
    }
}

fn default_plane() -> Material {
    Material::ground_plane()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub light: LightConfig,

    #[serde(default = "default_plane")]
    pub plane: Material,

    #[serde(default)]
    pub spheres: Vec<SphereConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentConfig>,

    #[serde(default)]
    pub render: RenderSettings,
}

impl Scene {
    /// Built-in scene used when no file is given: a ring of spheres around a glowing one.
    pub fn demo() -> Self {
        let mut spheres = vec![SphereConfig {
            name: Some("lamp".to_string()),
            position: [0.0, 1.0, 0.0],
            radius: 1.0,
            material: Material {
                smoothness: 0.0,
                albedo: [0.0; 3],
                specular: [0.0; 3],
                emission: [4.0, 3.2, 2.4],
            },
        }];

        let palette = [
            [0.9, 0.2, 0.2],
            [0.2, 0.8, 0.3],
            [0.2, 0.4, 0.9],
            [0.9, 0.8, 0.2],
            [0.8, 0.8, 0.8],
            [0.6, 0.3, 0.8],
        ];
        for (i, albedo) in palette.iter().enumerate() {
            let angle = i as f32 / palette.len() as f32 * std::f32::consts::TAU;
            let metal = i % 2 == 1;
            let position = Vec3::new(angle.cos() * 3.5, 0.7, angle.sin() * 3.5);
            spheres.push(SphereConfig {
                name: None,
                position: position.into(),
                radius: 0.7,
                material: Material {
                    smoothness: if metal { 0.9 } else { 0.2 },
                    albedo: if metal { [0.0; 3] } else { *albedo },
                    specular: if metal { *albedo } else { [0.04; 3] },
                    emission: [0.0; 3],
                },
            });
        }

        Self {
            camera: CameraConfig {
                position: [0.0, 3.0, 10.0],
                rotation: [-12.0, 0.0],
                fov: DEFAULT_FOV,
            },
            light: LightConfig::default(),
            plane: Material::ground_plane(),
            spheres,
            environment: None,
            render: RenderSettings::default(),
        }
    }
}
