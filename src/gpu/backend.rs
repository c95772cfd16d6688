// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use bytemuck::{Pod, Zeroable};

use crate::error::GpuError;
use crate::render::image::FrameImage;
use crate::scene::primitive::Primitive;

/// Uniform block read by the ray-tracing kernel. Must match the WGSL `Params` struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TraceUniforms {
    pub camera_to_world: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    /// Sub-pixel jitter added to the pixel coordinate.
    pub pixel_offset: [f32; 2],
    /// Per-frame random seed in [0, 1).
    pub seed: f32,
    pub sphere_count: u32,

    pub plane_albedo: [f32; 3],
    pub plane_smoothness: f32,
    pub plane_specular: [f32; 3],
    pub environment_intensity: f32,
    pub plane_emission: [f32; 3],
    pub has_environment: u32,

    /// Light direction (xyz) and intensity (w).
    pub sun_light: [f32; 4],

    pub width: u32,
    pub height: u32,
    pub max_bounces: u32,
    pub frame_index: u32,
}

const _: () = assert!(std::mem::size_of::<TraceUniforms>() == 224);

/// Anything that can report its allocated byte size.
pub trait GpuBuffer {
    fn size(&self) -> u64;
}

impl GpuBuffer for wgpu::Buffer {
    fn size(&self) -> u64 {
        wgpu::Buffer::size(self)
    }
}

/// The compute kernel as seen by the frame loop.
///
/// Implementations own the device. The core only allocates through it, pushes
/// uniforms and the packed primitive array, dispatches, and reads the raw
/// radiance image back.
pub trait ComputeBackend {
    type Buffer: GpuBuffer;
    type Target;

    /// Allocate a storage buffer sized exactly for `primitives` and upload them.
    fn create_primitive_buffer(&self, primitives: &[Primitive]) -> Result<Self::Buffer, GpuError>;

    /// Overwrite an existing buffer in place. `primitives` always fits.
    fn write_primitive_buffer(&self, buffer: &Self::Buffer, primitives: &[Primitive]);

    /// Allocate the kernel's output image.
    fn create_target(&self, width: u32, height: u32) -> Result<Self::Target, GpuError>;

    /// Run one trace pass over `workgroups` tiles. `primitives` is `None` for an empty scene.
    fn dispatch(
        &self,
        uniforms: &TraceUniforms,
        primitives: Option<&Self::Buffer>,
        target: &Self::Target,
        workgroups: [u32; 2],
    ) -> Result<(), GpuError>;

    /// Block until the dispatch finished and copy the target into `out`.
    fn read_target(&self, target: &Self::Target, out: &mut FrameImage) -> Result<(), GpuError>;
}
