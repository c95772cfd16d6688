// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

// GPU / compute
pub const WORKGROUP_SIZE: u32 = 8;

// Byte stride of one packed sphere record; the kernel's buffer reader depends on it.
pub const PRIMITIVE_STRIDE: u64 = 56;

// Readback / accumulation: vec4<f32> = 16 bytes per pixel
pub const IMAGE_BYTES_PER_PIXEL: u32 = 16;

// Camera defaults
pub const DEFAULT_FOV: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 0.3;
pub const DEFAULT_FAR: f32 = 1000.0;
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 2.0, 10.0];

// Light defaults (pitch/yaw in degrees)
pub const DEFAULT_LIGHT_ROTATION: [f32; 2] = [-50.0, -30.0];
pub const DEFAULT_LIGHT_INTENSITY: f32 = 1.0;

// Ground plane defaults
pub const DEFAULT_PLANE_SMOOTHNESS: f32 = 0.1;
pub const DEFAULT_PLANE_ALBEDO: [f32; 3] = [0.8, 0.8, 0.8];
pub const DEFAULT_PLANE_SPECULAR: [f32; 3] = [0.04, 0.04, 0.04];

// Sphere defaults
pub const DEFAULT_SPHERE_ALBEDO: [f32; 3] = [0.8, 0.8, 0.8];
pub const DEFAULT_SPHERE_SPECULAR: [f32; 3] = [0.04, 0.04, 0.04];

// Render settings defaults
pub const DEFAULT_JITTER_RANGE: [f32; 2] = [0.0, 1.0];
pub const DEFAULT_MAX_BOUNCES: u32 = 8;
pub const DEFAULT_FRAMES: u32 = 256;
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;
pub const DEFAULT_OUTPUT_PATH: &str = "render.png";
pub const DEFAULT_ENVIRONMENT_INTENSITY: f32 = 1.0;

// Progress log cadence (in samples)
pub const PROGRESS_LOG_INTERVAL: u64 = 64;

// Environment overrides
pub const ENV_FRAMES: &str = "TRACER_FRAMES";
pub const ENV_SEED: &str = "TRACER_SEED";

/// Resolve a data-file path: check next to the executable first, then CWD.
pub fn resolve_data_path(relative: &str) -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let path = dir.join(relative);
            if path.exists() {
                return path;
            }
        }
    }
    PathBuf::from(relative)
}

/// Resolve a path referenced from a scene file:
/// 1. Absolute paths and paths reachable from CWD are returned as-is
/// 2. Then relative to the scene file's directory
/// 3. Then via `resolve_data_path()`
/// 4. Otherwise unchanged, so the caller reports the missing file
pub fn resolve_resource_path(scene_dir: &Path, relative: &str) -> String {
    if Path::new(relative).exists() {
        return relative.to_string();
    }
    let scene_relative = scene_dir.join(relative);
    if scene_relative.exists() {
        return scene_relative.to_string_lossy().into_owned();
    }
    let data = resolve_data_path(relative);
    if data.exists() {
        return data.to_string_lossy().into_owned();
    }
    relative.to_string()
}
