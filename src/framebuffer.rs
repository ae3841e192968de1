// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shared framebuffer.  There is exactly one writer, the pixel
//! sink, and any number of readers polling it for display.  Cells are
//! packed RGBA words stored in atomics, so a reader may see a frame
//! that is partly old and partly new but never a torn pixel.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::colour::Colour;

struct Cells {
    width: usize,
    height: usize,
    cells: Vec<AtomicU32>,
}

impl Cells {
    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Allocate a `width` × `height` framebuffer filled with `background`
/// and return its only writer together with a reader.
pub fn allocate(width: usize, height: usize, background: Colour) -> (FrameWriter, FrameView) {
    let fill = background.to_u32();
    let cells = Arc::new(Cells {
        width,
        height,
        cells: (0..width * height).map(|_| AtomicU32::new(fill)).collect(),
    });
    (FrameWriter(cells.clone()), FrameView(cells))
}

/// The write handle.  Not `Clone`: whoever holds it is the only
/// writer.
pub struct FrameWriter(Arc<Cells>);

impl FrameWriter {
    /// Store a colour.  Returns false, and writes nothing, if the
    /// coordinate is outside the frame.
    pub fn put(&mut self, x: usize, y: usize, colour: Colour) -> bool {
        match self.0.offset(x, y) {
            Some(offset) => {
                self.0.cells[offset].store(colour.to_u32(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

/// A read handle; clone freely.
#[derive(Clone)]
pub struct FrameView(Arc<Cells>);

impl FrameView {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.0.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.0.height
    }

    /// The colour currently stored at a coordinate.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        self.0
            .offset(x, y)
            .map(|offset| Colour::from_u32(self.0.cells[offset].load(Ordering::Relaxed)))
    }

    /// A best-effort copy of the whole frame as row-major RGBA bytes,
    /// the layout image encoders and display surfaces expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.cells.len() * 4);
        for cell in &self.0.cells {
            bytes.extend_from_slice(&cell.load(Ordering::Relaxed).to_be_bytes());
        }
        bytes
    }
}
