// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::mpsc;

use anyhow::{Context, Result};
use bytemuck::Zeroable;

use super::backend::{ComputeBackend, TraceUniforms};
use super::buffers::{
    create_float_texture, create_output_texture, create_readback_buffer, create_storage_buffer,
    create_uniform_buffer, padded_bytes_per_row, update_storage_buffer, update_uniform_buffer,
};
use super::context::GpuContext;
use super::pipeline::{create_compute_pipeline, create_trace_bind_group_layout};
use crate::constants::IMAGE_BYTES_PER_PIXEL;
use crate::error::GpuError;
use crate::io::environment::EnvironmentMap;
use crate::render::image::FrameImage;
use crate::scene::primitive::{Primitive, buffer_size};
use crate::shaders::composer::{ShaderComposer, TRACE_ENTRY};

/// Output image of the trace kernel plus the mappable buffer it is copied into.
pub struct OutputTarget {
    view: wgpu::TextureView,
    texture: wgpu::Texture,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    bytes_per_row: u32,
}

/// The ray-tracing compute kernel running on a wgpu device.
pub struct WgpuBackend {
    context: GpuContext,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    // Bound in place of the sphere array when the scene is empty.
    placeholder_spheres: wgpu::Buffer,
    _environment: wgpu::Texture,
    environment_view: wgpu::TextureView,
}

impl WgpuBackend {
    pub fn new(context: GpuContext, environment: &EnvironmentMap) -> Result<Self> {
        let source = ShaderComposer::with_overrides()?
            .compose(TRACE_ENTRY)
            .context("Failed to compose trace kernel")?;

        let device = &context.device;
        let bind_group_layout = create_trace_bind_group_layout(device);
        let pipeline = context
            .checked("trace pipeline", 0, |device| {
                create_compute_pipeline(device, &source, &[&bind_group_layout], "trace pipeline")
            })
            .context("Failed to build trace kernel")?;

        let uniform_buffer =
            create_uniform_buffer(device, &TraceUniforms::zeroed(), "trace uniforms");
        let placeholder_spheres =
            create_storage_buffer(device, &[Primitive::zeroed()], "placeholder spheres");
        let (environment_texture, environment_view) = create_float_texture(
            device,
            &context.queue,
            environment.width,
            environment.height,
            &environment.texels,
            "environment map",
        );

        log::info!("Trace kernel ready");

        Ok(Self {
            context,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            placeholder_spheres,
            _environment: environment_texture,
            environment_view,
        })
    }

    fn bind_group(&self, spheres: &wgpu::Buffer, target: &OutputTarget) -> wgpu::BindGroup {
        self.context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("trace bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: spheres.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&target.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(&self.environment_view),
                    },
                ],
            })
    }
}

impl ComputeBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Target = OutputTarget;

    fn create_primitive_buffer(&self, primitives: &[Primitive]) -> Result<wgpu::Buffer, GpuError> {
        let bytes = buffer_size(primitives.len());
        self.context.checked("sphere buffer", bytes, |device| {
            create_storage_buffer(device, primitives, "spheres")
        })
    }

    fn write_primitive_buffer(&self, buffer: &wgpu::Buffer, primitives: &[Primitive]) {
        update_storage_buffer(&self.context.queue, buffer, primitives);
    }

    fn create_target(&self, width: u32, height: u32) -> Result<OutputTarget, GpuError> {
        let bytes_per_row = padded_bytes_per_row(width);
        let readback_size = u64::from(bytes_per_row) * u64::from(height);
        let image_size = u64::from(width) * u64::from(height) * u64::from(IMAGE_BYTES_PER_PIXEL);

        let (texture, view, readback) =
            self.context
                .checked("output image", image_size + readback_size, |device| {
                    let (texture, view) = create_output_texture(device, width, height, "output");
                    let readback = create_readback_buffer(device, readback_size, "output readback");
                    (texture, view, readback)
                })?;

        log::debug!("Allocated {width}x{height} output image");
        Ok(OutputTarget {
            view,
            texture,
            readback,
            width,
            height,
            bytes_per_row,
        })
    }

    fn dispatch(
        &self,
        uniforms: &TraceUniforms,
        primitives: Option<&wgpu::Buffer>,
        target: &OutputTarget,
        workgroups: [u32; 2],
    ) -> Result<(), GpuError> {
        update_uniform_buffer(&self.context.queue, &self.uniform_buffer, uniforms);
        let spheres = primitives.unwrap_or(&self.placeholder_spheres);

        self.context.checked("trace dispatch", 0, |device| {
            let bind_group = self.bind_group(spheres, target);
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trace encoder"),
            });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("trace pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(workgroups[0], workgroups[1], 1);
            }
            encoder.copy_texture_to_buffer(
                wgpu::ImageCopyTexture {
                    texture: &target.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyBuffer {
                    buffer: &target.readback,
                    layout: wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(target.bytes_per_row),
                        rows_per_image: Some(target.height),
                    },
                },
                wgpu::Extent3d {
                    width: target.width,
                    height: target.height,
                    depth_or_array_layers: 1,
                },
            );
            self.context.queue.submit(Some(encoder.finish()));
        })
    }

    fn read_target(&self, target: &OutputTarget, out: &mut FrameImage) -> Result<(), GpuError> {
        let slice = target.readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.context.device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| GpuError::ReadbackLost)??;

        {
            let data = slice.get_mapped_range();
            let row_bytes = (target.width * IMAGE_BYTES_PER_PIXEL) as usize;
            let row_floats = target.width as usize * 4;
            let floats = out.as_floats_mut();
            for row in 0..target.height as usize {
                let src = &data[row * target.bytes_per_row as usize..][..row_bytes];
                let dst = &mut floats[row * row_floats..][..row_floats];
                bytemuck::cast_slice_mut::<f32, u8>(dst).copy_from_slice(src);
            }
        }
        target.readback.unmap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORKGROUP_SIZE;
    use crate::gpu::buffers::dispatch_size;

    #[test]
    #[ignore = "needs a compute-capable GPU adapter"]
    fn test_empty_scene_renders_sky_on_device() {
        let context = GpuContext::new().unwrap();
        let backend = WgpuBackend::new(context, &EnvironmentMap::default()).unwrap();
        let (width, height) = (13, 9);
        let target = backend.create_target(width, height).unwrap();

        let uniforms = TraceUniforms {
            camera_to_world: glam::Mat4::IDENTITY.to_cols_array_2d(),
            inverse_projection: glam::Mat4::perspective_rh(1.0, 13.0 / 9.0, 0.3, 1000.0)
                .inverse()
                .to_cols_array_2d(),
            width,
            height,
            max_bounces: 1,
            ..TraceUniforms::zeroed()
        };
        let workgroups = [
            dispatch_size(width, WORKGROUP_SIZE),
            dispatch_size(height, WORKGROUP_SIZE),
        ];
        backend.dispatch(&uniforms, None, &target, workgroups).unwrap();

        let mut out = FrameImage::new(width, height);
        backend.read_target(&target, &mut out).unwrap();

        // Camera at the origin looks along -Z above the ground: every pixel sees sky.
        let [r, g, b, a] = out.pixel(width / 2, 0);
        assert!(r > 0.0 && g > 0.0 && b > 0.0);
        assert_eq!(a, 1.0);
    }
}
