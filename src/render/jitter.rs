// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fresh sampling pattern for one dispatch. Never a reason to reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameJitter {
    pub pixel_offset: [f32; 2],
    pub seed: f32,
}

/// Draws per-frame jitter; seeded for reproducible renders.
pub struct JitterSampler {
    rng: StdRng,
    range: [f32; 2],
}

impl JitterSampler {
    pub fn new(range: [f32; 2], seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            range: ordered(range),
        }
    }

    pub fn range(&self) -> [f32; 2] {
        self.range
    }

    pub fn set_range(&mut self, range: [f32; 2]) {
        self.range = ordered(range);
    }

    pub fn next_frame(&mut self) -> FrameJitter {
        FrameJitter {
            pixel_offset: [self.offset(), self.offset()],
            seed: self.rng.random::<f32>(),
        }
    }

    fn offset(&mut self) -> f32 {
        let [lo, hi] = self.range;
        if lo < hi {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }
}

fn ordered([a, b]: [f32; 2]) -> [f32; 2] {
    if a <= b { [a, b] } else { [b, a] }
}
