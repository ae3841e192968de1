// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What a single worker does with the block it was handed.

use crossbeam::channel::Sender;
use log::trace;

use crate::blocks::WorkBlock;
use crate::cancel::CancelToken;
use crate::sampler::{Jitter, PixelResult, PixelSampler};
use crate::scheduler::{BlockOutcome, BlockReport};

/// Resolve every pixel of `block` and push it onto the pixel stream.
/// The cancel token is checked between pixels.  If the stream has no
/// receiver left the block is reported as faulted.
pub fn render_block(
    sampler: &PixelSampler,
    jitter: Jitter,
    block: &WorkBlock,
    pixels: &Sender<PixelResult>,
    cancel: &CancelToken,
) -> BlockReport {
    let mut offsets = jitter.for_block(block.id);
    let mut emitted = 0;
    let mut outcome = BlockOutcome::Completed;

    for pixel in block.pixels() {
        if cancel.is_cancelled() {
            outcome = BlockOutcome::Cancelled;
            break;
        }
        if pixels.send(sampler.sample(pixel, &mut offsets)).is_err() {
            outcome = BlockOutcome::Faulted("pixel stream closed".to_string());
            break;
        }
        emitted += 1;
    }

    trace!("block {}: {} of {} pixels, {:?}", block.id, emitted, block.len(), outcome);
    BlockReport {
        block: *block,
        pixels: emitted,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::planes::{Pixel, PlaneMapper};
    use crossbeam::channel::unbounded;
    use num::Complex;
    use std::collections::HashSet;

    fn block() -> WorkBlock {
        WorkBlock {
            id: 7,
            x_start: 4,
            x_end: 8,
            y_start: 0,
            y_end: 3,
        }
    }

    fn sampler() -> PixelSampler {
        PixelSampler::new(PlaneMapper::new(8, Complex::new(-0.2, -0.2), 0.4), 50, 2)
    }

    #[test]
    fn emits_each_pixel_of_the_block_once() {
        let (tx, rx) = unbounded();
        let cancel = CancelToken::new();
        let report = render_block(&sampler(), Jitter::Fixed(0.5, 0.5), &block(), &tx, &cancel);
        drop(tx);
        assert_eq!(report.outcome, BlockOutcome::Completed);
        assert_eq!(report.pixels, 12);

        let seen: Vec<PixelResult> = rx.iter().collect();
        let unique: HashSet<Pixel> = seen.iter().map(|p| Pixel(p.x, p.y)).collect();
        assert_eq!(seen.len(), 12);
        assert_eq!(unique.len(), 12);
        let expected: HashSet<Pixel> = block().pixels().collect();
        assert_eq!(unique, expected);
        // The whole window is inside the main cardioid.
        assert!(seen.iter().all(|p| p.colour == Colour::BLACK));
    }

    #[test]
    fn stops_when_cancelled() {
        let (tx, rx) = unbounded();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = render_block(&sampler(), Jitter::Random, &block(), &tx, &cancel);
        assert_eq!(report.outcome, BlockOutcome::Cancelled);
        assert_eq!(report.pixels, 0);
        drop(tx);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn closed_stream_is_a_fault() {
        let (tx, rx) = unbounded();
        drop(rx);
        let cancel = CancelToken::new();
        let report = render_block(&sampler(), Jitter::Seeded(1), &block(), &tx, &cancel);
        assert_eq!(report.outcome, BlockOutcome::Faulted("pixel stream closed".to_string()));
        assert_eq!(report.pixels, 0);
    }
}
