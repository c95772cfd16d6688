// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Lifecycle precondition violations on the scene registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene object is already registered (index {index})")]
    AlreadyRegistered { index: usize },

    #[error("scene object is not registered")]
    NotRegistered,
}

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found (compute shaders require Vulkan, Metal or DX12)")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("out of GPU memory while allocating {label} ({bytes} bytes)")]
    OutOfMemory { label: String, bytes: u64 },

    #[error("GPU validation error in {label}: {message}")]
    Validation { label: String, message: String },

    #[error("failed to map readback buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("readback channel closed before the GPU finished")]
    ReadbackLost,
}

/// Failure of one frame step; the frame is aborted for that tick.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("raw frame is {raw_width}x{raw_height} but the converged image is {width}x{height}")]
    SizeMismatch {
        raw_width: u32,
        raw_height: u32,
        width: u32,
        height: u32,
    },
}
