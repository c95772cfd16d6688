// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Trace kernel sources compiled into the binary, keyed by module name.
const EMBEDDED_MODULES: &[(&str, &str)] = &[
    ("common", include_str!("wgsl/common.wgsl")),
    ("random", include_str!("wgsl/random.wgsl")),
    ("intersect", include_str!("wgsl/intersect.wgsl")),
    ("sky", include_str!("wgsl/sky.wgsl")),
    ("ray_trace", include_str!("wgsl/ray_trace.wgsl")),
];

/// Entry module of the trace kernel.
pub const TRACE_ENTRY: &str = "ray_trace";

/// WGSL shader composer that resolves `// #import module_name` directives.
///
/// Each `.wgsl` file can declare imports at the top, and the composer
/// concatenates them in dependency order with deduplication.
pub struct ShaderComposer {
    modules: HashMap<String, String>,
}

impl ShaderComposer {
    /// Composer preloaded with the sources built into the binary.
    pub fn embedded() -> Self {
        let mut composer = Self {
            modules: HashMap::new(),
        };
        for &(name, source) in EMBEDDED_MODULES {
            composer.register(name, source);
        }
        composer
    }

    /// Embedded sources, overridden by any `.wgsl` files found in `shader_dir()`.
    pub fn with_overrides() -> Result<Self> {
        let mut composer = Self::embedded();
        let dir = Self::shader_dir();
        if dir.is_dir() {
            Self::load_dir(&dir, &dir, &mut composer.modules)?;
            log::debug!("Loaded shader overrides from {}", dir.display());
        }
        Ok(composer)
    }

    /// Load all `.wgsl` files from a directory tree.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut modules = HashMap::new();
        Self::load_dir(dir, dir, &mut modules)?;
        Ok(Self { modules })
    }

    fn load_dir(base: &Path, dir: &Path, modules: &mut HashMap<String, String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read shader directory: {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::load_dir(base, &path, modules)?;
            } else if path.extension().is_some_and(|ext| ext == "wgsl") {
                let module_name = Self::path_to_module_name(base, &path);
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read shader: {}", path.display()))?;
                modules.insert(module_name, source);
            }
        }
        Ok(())
    }

    /// `base/lights/sun.wgsl` -> `lights::sun`
    fn path_to_module_name(base: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(base).unwrap_or(path);
        let stem = relative.with_extension("");
        stem.to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "::")
    }

    /// Compose a shader by resolving all imports recursively.
    pub fn compose(&self, entry_module: &str) -> Result<String> {
        let mut output = String::new();
        let mut visited = HashSet::new();
        self.resolve(entry_module, &mut output, &mut visited)?;
        Ok(output)
    }

    fn resolve(
        &self,
        module_name: &str,
        output: &mut String,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        if visited.contains(module_name) {
            return Ok(());
        }
        visited.insert(module_name.to_string());

        let source = self
            .modules
            .get(module_name)
            .with_context(|| format!("Shader module not found: {module_name}"))?;

        // Imports are emitted before the body of the module that names them.
        let mut body = String::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(import_name) = trimmed.strip_prefix("// #import ") {
                self.resolve(import_name.trim(), output, visited)?;
            } else {
                body.push_str(line);
                body.push('\n');
            }
        }
        output.push_str(&body);
        output.push('\n');

        Ok(())
    }

    pub fn register(&mut self, name: &str, source: &str) {
        self.modules.insert(name.to_string(), source.to_string());
    }

    /// Locate the shader directory relative to the executable, falling back to `./src/shaders/wgsl`.
    pub fn shader_dir() -> PathBuf {
        // Executables live in target/<profile>/, two levels below the source tree.
        let candidate = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.join("../../src/shaders/wgsl")));

        if let Some(path) = candidate.filter(|p| p.exists()) {
            return path;
        }

        PathBuf::from("src/shaders/wgsl")
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}
