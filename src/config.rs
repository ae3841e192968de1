// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render parameters.  Everything is fixed when the render starts.

use num::Complex;

use crate::blocks::{grid_dimension, EdgePolicy, Partition};
use crate::colour::Colour;
use crate::error::ConfigError;
use crate::planes::PlaneMapper;
use crate::sampler::{Jitter, PixelSampler};

/// Everything a render needs to know up front.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Point of the complex plane at the corner of pixel 0,0.
    pub origin: Complex<f64>,
    /// Height of the rendered window on the complex plane.
    pub extent: f64,
    /// Iteration limit for the escape-time loop.
    pub max_iterations: usize,
    /// Jittered samples averaged into each pixel.
    pub samples: usize,
    /// Requested number of work blocks; rounded down to a square.
    pub blocks: usize,
    /// Number of blocks computed concurrently.
    pub workers: usize,
    /// What happens to pixels the block grid does not divide evenly.
    pub edges: EdgePolicy,
    /// Where sub-sample offsets come from.
    pub jitter: Jitter,
    /// Fill colour of the framebuffer before any pixel lands.
    pub background: Colour,
    /// Capacity of the pixel stream; `None` for unbounded.
    pub pixel_queue: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 1023,
            height: 1023,
            origin: Complex::new(-2.0, -1.2),
            extent: 2.5,
            max_iterations: 500,
            samples: 100,
            blocks: 128,
            workers: 16,
            edges: EdgePolicy::default(),
            jitter: Jitter::default(),
            background: Colour::WHITE,
            pixel_queue: None,
        }
    }
}

impl RenderConfig {
    /// Check every parameter; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage(self.width, self.height));
        }
        if self.blocks == 0 {
            return Err(ConfigError::NoBlocks);
        }
        let grid = grid_dimension(self.blocks);
        if grid > self.width || grid > self.height {
            return Err(ConfigError::GridTooFine(grid, self.width, self.height));
        }
        if self.samples == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(ConfigError::BadExtent(self.extent));
        }
        if !self.origin.re.is_finite() || !self.origin.im.is_finite() {
            return Err(ConfigError::BadOrigin(self.origin.re, self.origin.im));
        }
        if let Jitter::Fixed(dx, dy) = self.jitter {
            let unit = |v: f64| v >= 0.0 && v < 1.0;
            if !unit(dx) || !unit(dy) {
                return Err(ConfigError::BadJitter(dx, dy));
            }
        }
        if self.pixel_queue == Some(0) {
            return Err(ConfigError::EmptyPixelQueue);
        }
        Ok(())
    }

    /// The block grid this configuration produces.
    pub fn partition(&self) -> Partition {
        Partition::new(self.width, self.height, self.blocks, self.edges)
    }

    /// The pixel-to-plane mapping.
    pub fn plane(&self) -> PlaneMapper {
        PlaneMapper::new(self.height, self.origin, self.extent)
    }

    /// The per-pixel sampler.
    pub fn sampler(&self) -> PixelSampler {
        PixelSampler::new(self.plane(), self.max_iterations, self.samples)
    }
}
