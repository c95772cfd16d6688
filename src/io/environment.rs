// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Equirectangular sky image, linear RGBA floats, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}

impl Default for EnvironmentMap {
    /// 1x1 black placeholder bound when the scene has no environment.
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl EnvironmentMap {
    /// Load any format the `image` crate decodes. HDR/EXR keep their range.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Failed to load environment map: {}", path.display()))?;
        let map = Self::from_image(img)?;
        log::info!(
            "Loaded environment map '{}' ({}x{})",
            path.display(),
            map.width,
            map.height
        );
        Ok(map)
    }

    pub fn from_image(img: image::DynamicImage) -> Result<Self> {
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        ensure!(width > 0 && height > 0, "Environment map is empty");
        Ok(Self {
            width,
            height,
            texels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_one_black_texel() {
        let map = EnvironmentMap::default();
        assert_eq!((map.width, map.height), (1, 1));
        assert_eq!(map.texels, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_from_image_converts_to_float_rgba() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        let map = EnvironmentMap::from_image(image::DynamicImage::ImageRgb8(img)).unwrap();

        assert_eq!((map.width, map.height), (2, 1));
        assert_eq!(map.texels.len(), 8);
        assert_eq!(&map.texels[..4], &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&map.texels[4..], &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = EnvironmentMap::load(Path::new("/nonexistent/sky.hdr")).unwrap_err();
        assert!(err.to_string().contains("Failed to load environment map"));
    }
}
