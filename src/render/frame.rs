// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use super::accumulator::Accumulator;
use super::change_tracker::{ChangeSignals, ChangeTracker, Viewport};
use super::image::FrameImage;
use super::jitter::{FrameJitter, JitterSampler};
use crate::camera::Camera;
use crate::constants::WORKGROUP_SIZE;
use crate::error::RenderError;
use crate::gpu::backend::{ComputeBackend, TraceUniforms};
use crate::gpu::buffers::dispatch_size;
use crate::scene::light::DirectionalLight;
use crate::scene::material::Material;
use crate::scene::object::SharedObject;
use crate::scene::registry::SceneRegistry;
use crate::scene::scene::RenderSettings;

/// What happened during one call to [`FrameOrchestrator::render_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Zero-area viewport: nothing dispatched, nothing accumulated.
    Skipped,
    Rendered(FrameReport),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Samples in the converged image after this frame.
    pub sample_count: u64,
    /// Accumulation restarted on this frame.
    pub reset: bool,
    /// Output targets were (re)allocated on this frame.
    pub reallocated: bool,
    pub signals: ChangeSignals,
    pub jitter: FrameJitter,
}

/// Per-frame driver: scene sync, change detection, dispatch, accumulation.
///
/// Owns the backend, the scene registry and the accumulator; the composition
/// root hands in the camera and light each frame.
pub struct FrameOrchestrator<K: ComputeBackend> {
    backend: K,
    registry: SceneRegistry<K::Buffer>,
    tracker: ChangeTracker,
    accumulator: Accumulator,
    target: Option<K::Target>,
    jitter: JitterSampler,
    plane: Material,
    has_environment: bool,
    environment_intensity: f32,
    max_bounces: u32,
    pending_reset: bool,
    frame_index: u32,
}

impl<K: ComputeBackend> FrameOrchestrator<K> {
    pub fn new(backend: K, settings: &RenderSettings) -> Self {
        Self {
            backend,
            registry: SceneRegistry::new(),
            tracker: ChangeTracker::new(),
            accumulator: Accumulator::default(),
            target: None,
            jitter: JitterSampler::new(settings.jitter_range, settings.seed),
            plane: Material::ground_plane(),
            has_environment: false,
            environment_intensity: 1.0,
            max_bounces: settings.max_bounces,
            pending_reset: true,
            frame_index: 0,
        }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn registry(&self) -> &SceneRegistry<K::Buffer> {
        &self.registry
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn sample_count(&self) -> u64 {
        self.accumulator.sample_count()
    }

    pub fn converged(&self) -> &FrameImage {
        self.accumulator.converged()
    }

    pub fn register(&mut self, object: SharedObject) -> Result<usize, RenderError> {
        self.registry.register(&self.backend, object)
    }

    pub fn unregister(&mut self, object: &SharedObject) -> Result<(), RenderError> {
        self.registry.unregister(&self.backend, object)
    }

    pub fn plane_material(&self) -> &Material {
        &self.plane
    }

    pub fn set_plane_material(&mut self, material: Material) {
        let material = material.sanitized();
        if material != self.plane {
            self.plane = material;
            self.pending_reset = true;
        }
    }

    /// Tell the kernel whether an environment map is bound, and how bright it is.
    pub fn set_environment(&mut self, bound: bool, intensity: f32) {
        if bound != self.has_environment || intensity != self.environment_intensity {
            self.has_environment = bound;
            self.environment_intensity = intensity;
            self.pending_reset = true;
        }
    }

    /// Jitter range changes the sampling pattern only; accumulation continues.
    pub fn set_jitter_range(&mut self, range: [f32; 2]) {
        self.jitter.set_range(range);
    }

    pub fn set_max_bounces(&mut self, max_bounces: u32) {
        if max_bounces != self.max_bounces {
            self.max_bounces = max_bounces;
            self.pending_reset = true;
        }
    }

    /// Restart accumulation on the next frame.
    pub fn request_reset(&mut self) {
        self.pending_reset = true;
    }

    /// Run one frame. Steps execute in a fixed order; see the numbered comments.
    pub fn render_frame(
        &mut self,
        camera: &mut Camera,
        light: &mut DirectionalLight,
        viewport: Viewport,
    ) -> Result<FrameOutcome, RenderError> {
        if viewport.is_empty() {
            log::debug!(
                "Skipping frame for empty viewport {}x{}",
                viewport.width,
                viewport.height
            );
            return Ok(FrameOutcome::Skipped);
        }

        // 1. (Re)allocate output targets on the first frame or a size change.
        let (target, reallocated) = match self.target.take() {
            Some(target) if self.accumulator.dimensions() == (viewport.width, viewport.height) => {
                (target, false)
            }
            stale => {
                drop(stale);
                let target = self.backend.create_target(viewport.width, viewport.height)?;
                self.accumulator.resize(viewport.width, viewport.height);
                log::debug!("Allocated {}x{} targets", viewport.width, viewport.height);
                (target, true)
            }
        };

        let result = self.trace(&target, camera, light, viewport, reallocated);
        self.target = Some(target);
        result.map(FrameOutcome::Rendered)
    }

    fn trace(
        &mut self,
        target: &K::Target,
        camera: &mut Camera,
        light: &mut DirectionalLight,
        viewport: Viewport,
        reallocated: bool,
    ) -> Result<FrameReport, RenderError> {
        let forced = std::mem::take(&mut self.pending_reset) || reallocated;

        // 2. Mirror dirty objects into the primitive buffer.
        let objects_changed = self.registry.sync_frame(&self.backend);

        // 3. Compare camera, light and viewport against the last consumed state.
        let signals = self.tracker.observe(camera, light, viewport, objects_changed);

        // 4. Decide, reset, then clear the one-shot flags.
        let reset = forced || signals.should_reset();
        if reset {
            self.accumulator.reset();
            log::debug!("Accumulation reset (forced: {forced}, {signals:?})");
        }
        self.tracker.consume(camera, light, viewport);

        // 5. Push uniforms and the primitive buffer, dispatch over 8x8 tiles.
        let jitter = self.jitter.next_frame();
        let uniforms = self.build_uniforms(camera, light, viewport, jitter);
        let workgroups = [
            dispatch_size(viewport.width, WORKGROUP_SIZE),
            dispatch_size(viewport.height, WORKGROUP_SIZE),
        ];
        self.backend
            .dispatch(&uniforms, self.registry.buffer(), target, workgroups)?;

        // 6. Read back the raw sample and blend it in.
        self.backend
            .read_target(target, self.accumulator.raw_frame_mut())?;
        self.accumulator.accumulate_raw()?;
        self.frame_index = self.frame_index.wrapping_add(1);

        Ok(FrameReport {
            sample_count: self.accumulator.sample_count(),
            reset,
            reallocated,
            signals,
            jitter,
        })
    }

    fn build_uniforms(
        &self,
        camera: &Camera,
        light: &DirectionalLight,
        viewport: Viewport,
        jitter: FrameJitter,
    ) -> TraceUniforms {
        TraceUniforms {
            camera_to_world: camera.camera_to_world().to_cols_array_2d(),
            inverse_projection: camera
                .inverse_projection(viewport.width, viewport.height)
                .to_cols_array_2d(),
            pixel_offset: jitter.pixel_offset,
            seed: jitter.seed,
            sphere_count: self.registry.len() as u32,
            plane_albedo: self.plane.albedo,
            plane_smoothness: self.plane.smoothness,
            plane_specular: self.plane.specular,
            environment_intensity: self.environment_intensity,
            plane_emission: self.plane.emission,
            has_environment: u32::from(self.has_environment),
            sun_light: light.to_vec4(),
            width: viewport.width,
            height: viewport.height,
            max_bounces: self.max_bounces,
            frame_index: self.frame_index,
        }
    }
}
