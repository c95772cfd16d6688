// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::{Duration, Instant};

use super::image::FrameImage;
use crate::error::RenderError;

/// Progressive running mean of raw frames since the last reset.
pub struct Accumulator {
    sample_count: u64,
    render_start: Instant,
    raw: FrameImage,
    converged: FrameImage,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sample_count: 0,
            render_start: Instant::now(),
            raw: FrameImage::new(0, 0),
            converged: FrameImage::new(0, 0),
        }
    }
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        let mut accumulator = Self::default();
        accumulator.resize(width, height);
        accumulator
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn elapsed(&self) -> Duration {
        self.render_start.elapsed()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.converged.dimensions()
    }

    pub fn converged(&self) -> &FrameImage {
        &self.converged
    }

    pub fn raw_frame(&self) -> &FrameImage {
        &self.raw
    }

    /// Destination for the kernel readback; blend it with [`Accumulator::accumulate_raw`].
    pub fn raw_frame_mut(&mut self) -> &mut FrameImage {
        &mut self.raw
    }

    /// Mark that the scene/camera changed and accumulation must restart.
    pub fn reset(&mut self) {
        self.sample_count = 0;
        self.render_start = Instant::now();
    }

    /// Reallocate both images when the size differs. A reallocation always resets.
    /// Returns true if the images were reallocated.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.converged.dimensions() == (width, height) {
            return false;
        }
        self.raw = FrameImage::new(width, height);
        self.converged = FrameImage::new(width, height);
        self.reset();
        true
    }

    /// Blend `raw` into the converged image and advance the sample count.
    pub fn accumulate(&mut self, raw: &FrameImage) -> Result<(), RenderError> {
        self.check_size(raw)?;
        blend_running_mean(self.converged.pixels_mut(), raw.pixels(), self.sample_count);
        self.sample_count += 1;
        Ok(())
    }

    /// Blend the internally held raw frame (filled through [`Accumulator::raw_frame_mut`]).
    pub fn accumulate_raw(&mut self) -> Result<(), RenderError> {
        self.check_size(&self.raw)?;
        blend_running_mean(self.converged.pixels_mut(), self.raw.pixels(), self.sample_count);
        self.sample_count += 1;
        Ok(())
    }

    fn check_size(&self, raw: &FrameImage) -> Result<(), RenderError> {
        if raw.dimensions() != self.converged.dimensions() {
            let (width, height) = self.converged.dimensions();
            return Err(RenderError::SizeMismatch {
                raw_width: raw.width(),
                raw_height: raw.height(),
                width,
                height,
            });
        }
        Ok(())
    }
}

/// `c += (raw - c) / (n + 1)`. The first sample after a reset is copied verbatim.
fn blend_running_mean(converged: &mut [[f32; 4]], raw: &[[f32; 4]], sample_count: u64) {
    if sample_count == 0 {
        converged.copy_from_slice(raw);
        return;
    }
    let weight = 1.0 / (sample_count as f32 + 1.0);
    for (c, r) in converged.iter_mut().zip(raw) {
        for ch in 0..4 {
            c[ch] += (r[ch] - c[ch]) * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_first_sample_after_reset_is_exact() {
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&FrameImage::filled(2, 2, [0.5; 4])).unwrap();
        acc.accumulate(&FrameImage::filled(2, 2, [0.9; 4])).unwrap();

        acc.reset();
        assert_eq!(acc.sample_count(), 0);

        let raw = FrameImage::filled(2, 2, [0.1, 0.3, 0.7, 1.0]);
        acc.accumulate(&raw).unwrap();
        assert_eq!(acc.converged(), &raw);
        assert_eq!(acc.sample_count(), 1);
    }

    #[test]
    fn test_constant_input_converges_to_itself() {
        let value = [0.3, 1.7, 0.01, 1.0];
        let raw = FrameImage::filled(3, 2, value);
        let mut acc = Accumulator::new(3, 2);
        for n in 1..=500 {
            acc.accumulate(&raw).unwrap();
            assert_eq!(acc.sample_count(), n);
            for px in acc.converged().pixels() {
                for ch in 0..4 {
                    assert_relative_eq!(px[ch], value[ch], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_two_samples_give_arithmetic_mean() {
        let mut acc = Accumulator::new(1, 1);
        acc.accumulate(&FrameImage::filled(1, 1, [0.25, 1.0, 2.0, 0.0]))
            .unwrap();
        acc.accumulate(&FrameImage::filled(1, 1, [0.75, 3.0, 4.0, 1.0]))
            .unwrap();
        assert_eq!(acc.converged().pixel(0, 0), [0.5, 2.0, 3.0, 0.5]);
    }

    #[test]
    fn test_running_mean_matches_batch_mean() {
        let samples = [0.2f32, 0.9, 0.4, 0.0, 1.3, 0.6, 0.75];
        let mut acc = Accumulator::new(1, 1);
        for &s in &samples {
            acc.accumulate(&FrameImage::filled(1, 1, [s; 4])).unwrap();
        }
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        assert_relative_eq!(acc.converged().pixel(0, 0)[0], mean, epsilon = 1e-6);
    }

    #[test]
    fn test_resize_reallocates_and_resets() {
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&FrameImage::filled(2, 2, [1.0; 4])).unwrap();

        assert!(!acc.resize(2, 2));
        assert_eq!(acc.sample_count(), 1);

        assert!(acc.resize(4, 3));
        assert_eq!(acc.sample_count(), 0);
        assert_eq!(acc.dimensions(), (4, 3));
        assert_eq!(acc.raw_frame().dimensions(), (4, 3));
    }

    #[test]
    fn test_stale_sized_frame_is_rejected() {
        let mut acc = Accumulator::new(4, 4);
        let err = acc
            .accumulate(&FrameImage::filled(2, 2, [1.0; 4]))
            .unwrap_err();
        assert!(matches!(err, RenderError::SizeMismatch { width: 4, .. }));
        assert_eq!(acc.sample_count(), 0);
    }

    #[test]
    fn test_count_past_u32_keeps_blending() {
        let mut acc = Accumulator::new(1, 1);
        acc.accumulate(&FrameImage::filled(1, 1, [0.5; 4])).unwrap();
        acc.sample_count = u64::from(u32::MAX);

        acc.accumulate(&FrameImage::filled(1, 1, [0.9; 4])).unwrap();
        assert_eq!(acc.sample_count(), u64::from(u32::MAX) + 1);
        // Weight is ~2^-32: the mean stays put instead of being replaced.
        assert_relative_eq!(acc.converged().pixel(0, 0)[0], 0.5, epsilon = 1e-6);

        acc.accumulate(&FrameImage::filled(1, 1, [0.9; 4])).unwrap();
        assert_eq!(acc.sample_count(), u64::from(u32::MAX) + 2);
    }

    #[test]
    fn test_accumulate_raw_uses_readback_image() {
        let mut acc = Accumulator::new(2, 1);
        acc.raw_frame_mut().fill([2.0; 4]);
        acc.accumulate_raw().unwrap();
        acc.raw_frame_mut().fill([4.0; 4]);
        acc.accumulate_raw().unwrap();
        assert_eq!(acc.converged().pixel(1, 0), [3.0; 4]);
    }
}
