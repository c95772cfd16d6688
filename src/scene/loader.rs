// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::scene::Scene;
use crate::constants::resolve_resource_path;

pub fn load_scene(path: &Path) -> Result<Scene> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

    let mut scene = parse_scene(&contents, path)?;

    // Resolve the environment map relative to the scene so scenes work from any CWD.
    let scene_dir = path.parent().unwrap_or(Path::new("."));
    if let Some(env) = &mut scene.environment {
        env.path = resolve_resource_path(scene_dir, &env.path);
    }

    log::info!(
        "Loaded scene: {} spheres, environment: {}",
        scene.spheres.len(),
        scene
            .environment
            .as_ref()
            .map_or("procedural sky", |e| e.path.as_str())
    );

    Ok(scene)
}

fn parse_scene(contents: &str, path: &Path) -> Result<Scene> {
    let scene = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(contents)
            .with_context(|| format!("Failed to parse JSON scene file: {}", path.display()))?,
        _ => serde_yml::from_str(contents)
            .with_context(|| format!("Failed to parse YAML scene file: {}", path.display()))?,
    };
    Ok(scene)
}
