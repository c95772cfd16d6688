// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result};

use crate::render::image::FrameImage;

/// Save the converged image. `.exr` and `.hdr` keep linear float radiance;
/// every other extension is tonemapped (clamped) and sRGB-encoded to 8 bits.
pub fn save_image(image: &FrameImage, path: &Path) -> Result<()> {
    let (width, height) = image.dimensions();
    let linear = image::Rgba32FImage::from_raw(width, height, image.as_floats().to_vec())
        .context("Failed to create image from pixel data")?;

    let hdr = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exr") || e.eq_ignore_ascii_case("hdr"));

    let result = if hdr {
        image::DynamicImage::ImageRgba32F(linear)
            .into_rgb32f()
            .save(path)
    } else {
        to_srgb8(image).save(path)
    };
    result.with_context(|| format!("Failed to save image to {}", path.display()))?;

    log::info!("Image saved to {}", path.display());
    Ok(())
}

fn to_srgb8(image: &FrameImage) -> image::RgbaImage {
    let (width, height) = image.dimensions();
    image::RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, _] = image.pixel(x, y);
        image::Rgba([encode_srgb(r), encode_srgb(g), encode_srgb(b), 255])
    })
}

fn encode_srgb(linear: f32) -> u8 {
    let c = if linear.is_finite() {
        linear.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let encoded = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0 + 0.5) as u8
}
