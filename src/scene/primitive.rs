// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use bytemuck::{Pod, Zeroable};

use super::material::Material;
use crate::constants::PRIMITIVE_STRIDE;

/// GPU-compatible sphere record. Must match the WGSL `Sphere` struct layout:
/// 14 tightly packed f32 values, 56 bytes, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Primitive {
    pub position: [f32; 3],
    pub radius: f32,
    pub smoothness: f32,
    pub albedo: [f32; 3],
    pub specular: [f32; 3],
    pub emission: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<Primitive>() as u64 == PRIMITIVE_STRIDE);

impl Primitive {
    pub fn sphere(position: [f32; 3], radius: f32, material: &Material) -> Self {
        let material = material.sanitized();
        Self {
            position,
            radius,
            smoothness: material.smoothness,
            albedo: material.albedo,
            specular: material.specular,
            emission: material.emission,
        }
    }

    pub fn material(&self) -> Material {
        Material {
            smoothness: self.smoothness,
            albedo: self.albedo,
            specular: self.specular,
            emission: self.emission,
        }
    }
}

/// Byte size of a buffer holding `count` primitives.
pub fn buffer_size(count: usize) -> u64 {
    count as u64 * PRIMITIVE_STRIDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_56_bytes_without_padding() {
        assert_eq!(std::mem::size_of::<Primitive>(), 56);
        assert_eq!(std::mem::align_of::<Primitive>(), 4);

        let prim = Primitive {
            position: [1.0, 2.0, 3.0],
            radius: 4.0,
            smoothness: 5.0,
            albedo: [6.0, 7.0, 8.0],
            specular: [9.0, 10.0, 11.0],
            emission: [12.0, 13.0, 14.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&prim));
        let expected: Vec<f32> = (1..=14).map(|i| i as f32).collect();
        assert_eq!(floats, expected.as_slice());
    }

    #[test]
    fn test_packed_array_stride() {
        let prims = vec![Primitive::zeroed(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&prims);
        assert_eq!(bytes.len() as u64, buffer_size(3));
    }

    #[test]
    fn test_sphere_copies_material() {
        let mat = Material {
            smoothness: 0.5,
            albedo: [0.1, 0.2, 0.3],
            specular: [0.4, 0.5, 0.6],
            emission: [1.0, 0.0, 0.0],
        };
        let prim = Primitive::sphere([0.0, 1.0, 0.0], 2.0, &mat);
        assert_eq!(prim.radius, 2.0);
        assert_eq!(prim.material(), mat);
    }
}
