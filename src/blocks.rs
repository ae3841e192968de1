// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Work partitioning.  The image is cut into an s×s grid of
//! rectangular blocks, s being the integer square root of the
//! requested block count, and each block is one unit of scheduling.

use crossbeam::channel::Sender;
use itertools::iproduct;
use log::{debug, warn};

use crate::planes::Pixel;

/// A rectangle of pixels, half-open on the far edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkBlock {
    /// Position in emission order.
    pub id: usize,
    /// First column.
    pub x_start: usize,
    /// One past the last column.
    pub x_end: usize,
    /// First row.
    pub y_start: usize,
    /// One past the last row.
    pub y_end: usize,
}

impl WorkBlock {
    /// Number of pixels in the block.
    pub fn len(&self) -> usize {
        (self.x_end - self.x_start) * (self.y_end - self.y_start)
    }

    /// Every pixel of the block, column by column.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(self.x_start..self.x_end, self.y_start..self.y_end).map(|(x, y)| Pixel(x, y))
    }
}

/// What to do with the remainder when the image does not divide
/// evenly by the grid dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgePolicy {
    /// The last column and row of blocks stretch to the image edge.
    Extend,
    /// Every block has the same size; the remainder is never rendered
    /// and keeps the background colour.
    Truncate,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        EdgePolicy::Extend
    }
}

/// The largest s with s * s <= n.
pub fn grid_dimension(n: usize) -> usize {
    let square = |s: usize| s.checked_mul(s);
    let mut s = (n as f64).sqrt() as usize;
    while square(s).map_or(true, |sq| sq > n) {
        s -= 1;
    }
    while square(s + 1).map_or(false, |sq| sq <= n) {
        s += 1;
    }
    s
}

/// The grid of blocks covering an image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Partition {
    width: usize,
    height: usize,
    grid: usize,
    edges: EdgePolicy,
}

impl Partition {
    /// Requested `blocks` is rounded down to a perfect square.
    pub fn new(width: usize, height: usize, blocks: usize, edges: EdgePolicy) -> Partition {
        Partition {
            width,
            height,
            grid: grid_dimension(blocks),
            edges,
        }
    }

    /// Blocks per row (and per column).
    pub fn grid(&self) -> usize {
        self.grid
    }

    /// Number of blocks the partition emits.
    pub fn len(&self) -> usize {
        self.grid * self.grid
    }

    fn span(&self, i: usize, extent: usize) -> (usize, usize) {
        let step = extent / self.grid;
        let end = if self.edges == EdgePolicy::Extend && i + 1 == self.grid {
            extent
        } else {
            (i + 1) * step
        };
        (i * step, end)
    }

    /// The blocks, in emission order.
    pub fn blocks(&self) -> impl Iterator<Item = WorkBlock> {
        let this = *self;
        iproduct!(0..self.grid, 0..self.grid)
            .enumerate()
            .map(move |(id, (i, j))| {
                let (x_start, x_end) = this.span(i, this.width);
                let (y_start, y_end) = this.span(j, this.height);
                WorkBlock {
                    id,
                    x_start,
                    x_end,
                    y_start,
                    y_end,
                }
            })
    }

    /// Pixels some block will render.
    pub fn covered_pixels(&self) -> usize {
        if self.grid == 0 {
            return 0;
        }
        let (_, x_end) = self.span(self.grid - 1, self.width);
        let (_, y_end) = self.span(self.grid - 1, self.height);
        x_end * y_end
    }

    /// Pixels no block will render.
    pub fn uncovered_pixels(&self) -> usize {
        self.width * self.height - self.covered_pixels()
    }

    /// Push every block onto the work queue, then drop the sender so
    /// the queue closes once it drains.  Returns the number of blocks
    /// actually queued, which is short only if every receiver has gone
    /// away.
    pub fn enqueue(&self, queue: Sender<WorkBlock>) -> usize {
        let uncovered = self.uncovered_pixels();
        if uncovered > 0 {
            warn!(
                "{}x{} grid leaves {} pixels of the {}x{} image unrendered",
                self.grid, self.grid, uncovered, self.width, self.height
            );
        }
        let mut queued = 0;
        for block in self.blocks() {
            if queue.send(block).is_err() {
                warn!("work queue closed after {} of {} blocks", queued, self.len());
                break;
            }
            queued += 1;
        }
        debug!("queued {} blocks", queued);
        queued
    }
}
