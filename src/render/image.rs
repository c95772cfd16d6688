// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// CPU-side RGBA float image, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl FrameImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0; 4])
    }

    pub fn filled(width: u32, height: u32, value: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: [f32; 4]) {
        self.pixels[(y * self.width + x) as usize] = value;
    }

    pub fn fill(&mut self, value: [f32; 4]) {
        self.pixels.fill(value);
    }

    /// Flat channel view for encoders.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn as_floats_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_addressing_is_row_major() {
        let mut img = FrameImage::new(3, 2);
        img.set_pixel(2, 1, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.pixels()[5], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.as_floats().len(), 24);
        assert_eq!(img.as_floats()[20..24], [1.0, 2.0, 3.0, 4.0]);
    }
}
