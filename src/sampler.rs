// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stochastic supersampling.  Each pixel is evaluated at several
//! randomly jittered points inside its area and the resulting colours
//! are averaged channel by channel.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::colour::{colourize, Colour};
use crate::escape::escape_time;
use crate::planes::{Pixel, PlaneMapper};

/// A single finished pixel, ready for the framebuffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelResult {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Averaged colour; always opaque.
    pub colour: Colour,
}

/// Anything that can hand out sub-pixel offsets on [0, 1).
pub trait JitterSource {
    /// The next (x, y) offset pair.
    fn offsets(&mut self) -> (f64, f64);
}

/// Uniformly distributed offsets.
pub struct RandomJitter(Uniform<f64>, StdRng);

impl RandomJitter {
    /// Seeded from the operating system; not reproducible.
    pub fn from_entropy() -> Self {
        RandomJitter(Uniform::new(0.0_f64, 1.0), StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        RandomJitter(Uniform::new(0.0_f64, 1.0), StdRng::seed_from_u64(seed))
    }
}

impl JitterSource for RandomJitter {
    fn offsets(&mut self) -> (f64, f64) {
        (self.0.sample(&mut self.1), self.0.sample(&mut self.1))
    }
}

/// The same offset every time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedJitter(pub f64, pub f64);

impl JitterSource for FixedJitter {
    fn offsets(&mut self) -> (f64, f64) {
        (self.0, self.1)
    }
}

/// How sub-sample offsets are chosen for a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Jitter {
    /// Fresh entropy for every block.
    Random,
    /// Every block derives its generator from this seed and its id,
    /// so the image does not depend on which worker ran which block.
    Seeded(u64),
    /// No randomness at all.
    Fixed(f64, f64),
}

impl Default for Jitter {
    fn default() -> Self {
        Jitter::Random
    }
}

impl Jitter {
    /// Build the offset source for one block.
    pub fn for_block(&self, block_id: usize) -> BlockJitter {
        match *self {
            Jitter::Random => BlockJitter::Random(RandomJitter::from_entropy()),
            Jitter::Seeded(seed) => BlockJitter::Random(RandomJitter::seeded(
                seed ^ (block_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
            )),
            Jitter::Fixed(dx, dy) => BlockJitter::Fixed(FixedJitter(dx, dy)),
        }
    }
}

/// The offset source a worker holds while it renders one block.
pub enum BlockJitter {
    /// Pseudo-random offsets.
    Random(RandomJitter),
    /// Constant offsets.
    Fixed(FixedJitter),
}

impl JitterSource for BlockJitter {
    fn offsets(&mut self) -> (f64, f64) {
        match self {
            BlockJitter::Random(j) => j.offsets(),
            BlockJitter::Fixed(j) => j.offsets(),
        }
    }
}

/// Everything needed to resolve a pixel to its final colour.
#[derive(Clone, Debug)]
pub struct PixelSampler {
    plane: PlaneMapper,
    max_iterations: usize,
    samples: usize,
}

impl PixelSampler {
    /// `samples` must be at least one; the render configuration
    /// guarantees it.
    pub fn new(plane: PlaneMapper, max_iterations: usize, samples: usize) -> Self {
        PixelSampler {
            plane,
            max_iterations,
            samples,
        }
    }

    /// Evaluate `samples` jittered points inside the pixel and return
    /// the truncated channel-wise mean of their colours.
    pub fn sample<J: JitterSource>(&self, pixel: Pixel, jitter: &mut J) -> PixelResult {
        let (mut r, mut g, mut b) = (0_u64, 0_u64, 0_u64);
        for _ in 0..self.samples {
            let point = self.plane.pixel_to_point(&pixel, jitter.offsets());
            let colour = colourize(&escape_time(point, self.max_iterations));
            r += u64::from(colour.r);
            g += u64::from(colour.g);
            b += u64::from(colour.b);
        }
        let n = self.samples as u64;
        PixelResult {
            x: pixel.0,
            y: pixel.1,
            colour: Colour::opaque((r / n) as u8, (g / n) as u8, (b / n) as u8),
        }
    }
}
