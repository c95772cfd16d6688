// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::camera::Camera;
use crate::constants::{DEFAULT_OUTPUT_PATH, ENV_FRAMES, ENV_SEED, PROGRESS_LOG_INTERVAL};
use crate::gpu::backend::ComputeBackend;
use crate::gpu::context::GpuContext;
use crate::gpu::kernel::WgpuBackend;
use crate::io::environment::EnvironmentMap;
use crate::io::screenshot::save_image;
use crate::render::change_tracker::Viewport;
use crate::render::frame::{FrameOrchestrator, FrameOutcome};
use crate::scene::light::DirectionalLight;
use crate::scene::loader::load_scene;
use crate::scene::object::SharedObject;
use crate::scene::scene::{RenderSettings, Scene};

pub fn run(scene_path: Option<String>, output: Option<String>) -> Result<()> {
    let mut scene = match &scene_path {
        Some(path) => load_scene(Path::new(path))?,
        None => {
            log::info!("No scene file given, rendering the built-in demo scene");
            Scene::demo()
        }
    };
    apply_env_overrides(&mut scene.render);

    let output = output
        .or_else(|| scene.render.output.clone())
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    let environment = scene
        .environment
        .as_ref()
        .map(|env| EnvironmentMap::load(Path::new(&env.path)).map(|map| (map, env.intensity)))
        .transpose()?;

    let context = GpuContext::new()?;
    let placeholder = EnvironmentMap::default();
    let sky = environment.as_ref().map_or(&placeholder, |(map, _)| map);
    let backend = WgpuBackend::new(context, sky)?;

    let mut renderer = FrameOrchestrator::new(backend, &scene.render);
    renderer.set_plane_material(scene.plane);
    if let Some((_, intensity)) = &environment {
        renderer.set_environment(true, *intensity);
    }

    let objects: Vec<SharedObject> = scene
        .spheres
        .iter()
        .map(|sphere| sphere.to_object().into_shared())
        .collect();
    for object in &objects {
        renderer.register(object.clone())?;
    }

    let mut camera = Camera::from_config(&scene.camera);
    let mut light = scene.light.to_light();
    let viewport = Viewport::new(scene.render.width, scene.render.height);

    render_progressive(
        &mut renderer,
        &mut camera,
        &mut light,
        viewport,
        scene.render.frames,
    )?;

    save_image(renderer.converged(), Path::new(&output))?;

    for object in &objects {
        renderer.unregister(object)?;
    }
    Ok(())
}

/// Drive `frames` frames of a static view and return the final sample count.
pub fn render_progressive<K: ComputeBackend>(
    renderer: &mut FrameOrchestrator<K>,
    camera: &mut Camera,
    light: &mut DirectionalLight,
    viewport: Viewport,
    frames: u32,
) -> Result<u64> {
    log::info!(
        "Rendering {frames} frames at {}x{} with {} spheres",
        viewport.width,
        viewport.height,
        renderer.registry().len()
    );

    for frame in 1..=frames {
        let outcome = renderer
            .render_frame(camera, light, viewport)
            .with_context(|| format!("Frame {frame} failed"))?;

        match outcome {
            FrameOutcome::Skipped => {
                log::warn!(
                    "Viewport {}x{} has no area, nothing to render",
                    viewport.width,
                    viewport.height
                );
                return Ok(0);
            }
            FrameOutcome::Rendered(report) => {
                if report.sample_count % PROGRESS_LOG_INTERVAL == 0 {
                    log::info!(
                        "{} samples ({:.1}s)",
                        report.sample_count,
                        renderer.accumulator().elapsed().as_secs_f32()
                    );
                }
            }
        }
    }

    let samples = renderer.sample_count();
    log::info!(
        "Converged {samples} samples in {:.2}s",
        renderer.accumulator().elapsed().as_secs_f32()
    );
    Ok(samples)
}

fn apply_env_overrides(settings: &mut RenderSettings) {
    if let Some(frames) = env_override::<u32>(ENV_FRAMES).filter(|&frames| frames > 0) {
        settings.frames = frames;
    }
    if let Some(seed) = env_override::<u64>(ENV_SEED) {
        settings.seed = Some(seed);
    }
}

fn env_override<T: FromStr + std::fmt::Display>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    parse_override(name, &val)
}

fn parse_override<T: FromStr + std::fmt::Display>(name: &str, val: &str) -> Option<T> {
    match val.trim().parse::<T>() {
        Ok(parsed) => {
            log::info!("{name}={parsed}");
            Some(parsed)
        }
        Err(_) => {
            log::warn!("{name}={val:?} invalid, using scene value");
            None
        }
    }
}
