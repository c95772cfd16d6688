// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::GpuError;

/// Headless device + queue for compute work; nothing is presented to a surface.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    pub fn new() -> Result<Self, GpuError> {
        // Compute + float storage textures need one of these.
        let backends = wgpu::Backends::VULKAN | wgpu::Backends::METAL | wgpu::Backends::DX12;
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} (backend: {:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Tracer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                ..Default::default()
            },
            None,
        ))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Run `allocate` inside out-of-memory and validation error scopes.
    pub fn checked<T>(
        &self,
        label: &str,
        bytes: u64,
        allocate: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let value = allocate(&self.device);
        let oom = pollster::block_on(self.device.pop_error_scope());
        let validation = pollster::block_on(self.device.pop_error_scope());

        if oom.is_some() {
            log::error!("Out of GPU memory allocating {label} ({bytes} bytes)");
            return Err(GpuError::OutOfMemory {
                label: label.to_string(),
                bytes,
            });
        }
        if let Some(err) = validation {
            return Err(GpuError::Validation {
                label: label.to_string(),
                message: err.to_string(),
            });
        }
        Ok(value)
    }
}
