// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PLANE_ALBEDO, DEFAULT_PLANE_SMOOTHNESS, DEFAULT_PLANE_SPECULAR, DEFAULT_SPHERE_ALBEDO,
    DEFAULT_SPHERE_SPECULAR,
};

/// Smoothness / albedo / specular / emission material shared by spheres and the ground plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Material {
    /// Surface smoothness in [0, 1]; 1 is a perfect mirror lobe.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub smoothness: f32,

    #[serde(default = "default_albedo", skip_serializing_if = "is_default_albedo")]
    pub albedo: [f32; 3],

    #[serde(
        default = "default_specular",
        skip_serializing_if = "is_default_specular"
    )]
    pub specular: [f32; 3],

    /// Emitted radiance (linear).
    #[serde(default, skip_serializing_if = "is_zero_vec3")]
    pub emission: [f32; 3],
}

fn default_albedo() -> [f32; 3] {
    DEFAULT_SPHERE_ALBEDO
}

fn default_specular() -> [f32; 3] {
    DEFAULT_SPHERE_SPECULAR
}

fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

fn is_zero_vec3(v: &[f32; 3]) -> bool {
    v[0] == 0.0 && v[1] == 0.0 && v[2] == 0.0
}

fn is_default_albedo(v: &[f32; 3]) -> bool {
    *v == default_albedo()
}

fn is_default_specular(v: &[f32; 3]) -> bool {
    *v == default_specular()
}

impl Default for Material {
    fn default() -> Self {
        Self {
            smoothness: 0.0,
            albedo: default_albedo(),
            specular: default_specular(),
            emission: [0.0; 3],
        }
    }
}

impl Material {
    /// Material with smoothness clamped into [0, 1].
    pub fn sanitized(self) -> Self {
        Self {
            smoothness: self.smoothness.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.iter().any(|&c| c > 0.0)
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Default ground plane look: slightly glossy light grey.
    pub fn ground_plane() -> Self {
        Self {
            smoothness: DEFAULT_PLANE_SMOOTHNESS,
            albedo: DEFAULT_PLANE_ALBEDO,
            specular: DEFAULT_PLANE_SPECULAR,
            emission: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_smoothness() {
        let mat = Material {
            smoothness: 1.7,
            ..Material::default()
        };
        assert_eq!(mat.sanitized().smoothness, 1.0);

        let mat = Material {
            smoothness: -0.2,
            ..Material::default()
        };
        assert_eq!(mat.sanitized().smoothness, 0.0);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mat: Material = serde_yml::from_str("emission: [2.0, 1.0, 0.5]").unwrap();
        assert_eq!(mat.albedo, DEFAULT_SPHERE_ALBEDO);
        assert_eq!(mat.specular, DEFAULT_SPHERE_SPECULAR);
        assert!(mat.is_emissive());
        assert!(!mat.is_default());
    }
}
