// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The consumer end of the pixel stream.

use crossbeam::channel::Receiver;
use log::{debug, error};

use crate::framebuffer::FrameWriter;
use crate::progress::ProgressWriter;
use crate::sampler::PixelResult;

/// What the sink saw over its lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkSummary {
    /// Pixels written into the frame.
    pub written: usize,
    /// Pixels whose coordinates fell outside the frame.
    pub rejected: usize,
}

/// Owns the framebuffer and progress writers; nothing else may touch
/// them.
pub struct PixelSink {
    frame: FrameWriter,
    progress: ProgressWriter,
}

impl PixelSink {
    /// Take ownership of the two writers.
    pub fn new(frame: FrameWriter, progress: ProgressWriter) -> Self {
        PixelSink { frame, progress }
    }

    /// Write one pixel and advance the counter.
    pub fn accept(&mut self, pixel: &PixelResult) -> bool {
        if !self.frame.put(pixel.x, pixel.y, pixel.colour) {
            error!("pixel {},{} is outside the frame", pixel.x, pixel.y);
            return false;
        }
        self.progress.advance();
        true
    }

    /// Consume pixels until every sender has hung up.
    pub fn drain(mut self, pixels: Receiver<PixelResult>) -> SinkSummary {
        let mut summary = SinkSummary::default();
        for pixel in pixels.iter() {
            if self.accept(&pixel) {
                summary.written += 1;
            } else {
                summary.rejected += 1;
            }
        }
        debug!(
            "pixel stream closed after {} pixels ({} rejected)",
            summary.written, summary.rejected
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::framebuffer::allocate;
    use crate::progress::counter;
    use crossbeam::channel::unbounded;
    use std::thread;

    #[test]
    fn drains_until_stream_closes() {
        let (frame, view) = allocate(4, 4, Colour::WHITE);
        let (progress, done) = counter(16);
        let (tx, rx) = unbounded();
        let sink = thread::spawn(move || PixelSink::new(frame, progress).drain(rx));

        for x in 0..4 {
            for y in 0..4 {
                tx.send(PixelResult {
                    x,
                    y,
                    colour: Colour::opaque(x as u8, y as u8, 0),
                })
                .unwrap();
            }
        }
        drop(tx);

        let summary = sink.join().unwrap();
        assert_eq!(summary.written, 16);
        assert_eq!(summary.rejected, 0);
        assert!(done.is_complete());
        assert_eq!(view.get(3, 1), Some(Colour::opaque(3, 1, 0)));
    }

    #[test]
    fn rejected_pixels_do_not_count() {
        let (frame, _view) = allocate(2, 2, Colour::WHITE);
        let (progress, done) = counter(4);
        let (tx, rx) = unbounded();
        tx.send(PixelResult {
            x: 5,
            y: 0,
            colour: Colour::BLACK,
        })
        .unwrap();
        tx.send(PixelResult {
            x: 1,
            y: 1,
            colour: Colour::BLACK,
        })
        .unwrap();
        drop(tx);
        let summary = PixelSink::new(frame, progress).drain(rx);
        assert_eq!(summary, SinkSummary { written: 1, rejected: 1 });
        assert_eq!(done.completed(), 1);
    }
}
