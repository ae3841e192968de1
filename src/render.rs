// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wiring.  A render is three concurrent stages joined by channels:
//! the partitioner fills the work queue, the worker pool turns blocks
//! into pixels, and the sink writes pixels into the framebuffer.  The
//! whole pipeline runs on a coordinator thread so the caller is free
//! to poll the frame while it fills in.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, unbounded, Sender};
use log::{error, info, warn};

use crate::blocks::{Partition, WorkBlock};
use crate::cancel::CancelToken;
use crate::config::RenderConfig;
use crate::error::{ConfigError, RenderError};
use crate::framebuffer::{self, FrameView};
use crate::progress::{self, ProgressView};
use crate::sampler::PixelResult;
use crate::scheduler::{BlockOutcome, BlockReport, WorkerPool};
use crate::sink::PixelSink;
use crate::worker::render_block;

/// Summary of a finished (or cancelled) render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// Blocks handed to a worker.
    pub blocks_dispatched: usize,
    /// Blocks whose every pixel was emitted.
    pub blocks_completed: usize,
    /// Pixels the sink wrote into the frame.
    pub pixels_written: usize,
    /// Pixels no block covers; they keep the background colour.
    pub uncovered_pixels: usize,
    /// Wall-clock time from start to the pixel stream closing.
    pub elapsed: Duration,
    /// True if the render stopped before every block completed.
    pub cancelled: bool,
}

/// A validated configuration, ready to render.
#[derive(Clone, Debug)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Validates the configuration; nothing runs yet.
    pub fn new(config: RenderConfig) -> Result<Renderer, ConfigError> {
        config.validate()?;
        Ok(Renderer { config })
    }

    /// The configuration this renderer was built with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Allocate the frame and start the pipeline in the background.
    pub fn start(&self) -> RenderHandle {
        let sampler = self.config.sampler();
        let jitter = self.config.jitter;
        self.start_with(move |block, pixels, cancel| {
            render_block(&sampler, jitter, block, pixels, cancel)
        })
    }

    /// As `start`, with `render` computing each block.
    pub(crate) fn start_with<F>(&self, render: F) -> RenderHandle
    where
        F: Fn(&WorkBlock, &Sender<PixelResult>, &CancelToken) -> BlockReport
            + Send
            + Sync
            + 'static,
    {
        let partition = self.config.partition();
        let (frame_writer, frame) =
            framebuffer::allocate(self.config.width, self.config.height, self.config.background);
        let (progress_writer, progress) = progress::counter(partition.covered_pixels());
        let sink = PixelSink::new(frame_writer, progress_writer);
        let cancel = CancelToken::new();

        let config = self.config.clone();
        let pipeline_cancel = cancel.clone();
        let thread = thread::spawn(move || {
            pipeline(&config, partition, sink, &pipeline_cancel, render)
        });

        RenderHandle {
            frame,
            progress,
            cancel,
            thread,
        }
    }

    /// Start, wait, and hand back the report with the finished frame.
    pub fn run(&self) -> Result<(RenderReport, FrameView), RenderError> {
        let handle = self.start();
        let frame = handle.frame().clone();
        let report = handle.join()?;
        Ok((report, frame))
    }
}

fn pipeline<F>(
    config: &RenderConfig,
    partition: Partition,
    sink: PixelSink,
    cancel: &CancelToken,
    render: F,
) -> Result<RenderReport, RenderError>
where
    F: Fn(&WorkBlock, &Sender<PixelResult>, &CancelToken) -> BlockReport + Sync,
{
    let started = Instant::now();
    info!(
        "rendering {}x{} as {}x{} blocks on {} workers, {} samples per pixel",
        config.width,
        config.height,
        partition.grid(),
        partition.grid(),
        config.workers,
        config.samples
    );

    let (block_tx, block_rx) = bounded(partition.len().max(1));
    let (pixel_tx, pixel_rx) = match config.pixel_queue {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    let pool = WorkerPool::new(config.workers);

    let (reports, summary) = crossbeam::scope(|scope| {
        scope.spawn(move |_| partition.enqueue(block_tx));
        let sink = scope.spawn(move |_| sink.drain(pixel_rx));
        let reports = pool.run(block_rx, pixel_tx, cancel, render);
        (reports, sink.join())
    })
    .map_err(|_| RenderError::Panicked)?;
    let reports = reports?;
    let summary = summary.map_err(|_| RenderError::Panicked)?;

    for report in &reports {
        if let BlockOutcome::Faulted(ref reason) = report.outcome {
            error!("render failed on block {}: {}", report.block.id, reason);
            return Err(RenderError::WorkerFault(report.block.id, reason.clone()));
        }
    }
    if summary.rejected > 0 {
        warn!("{} pixels fell outside the frame", summary.rejected);
    }

    let blocks_completed = reports.iter().filter(|r| r.is_completed()).count();
    let report = RenderReport {
        blocks_dispatched: reports.len(),
        blocks_completed,
        pixels_written: summary.written,
        uncovered_pixels: partition.uncovered_pixels(),
        elapsed: started.elapsed(),
        cancelled: blocks_completed < partition.len(),
    };
    if report.cancelled {
        info!(
            "cancelled after {} of {} blocks, {} pixels",
            blocks_completed,
            partition.len(),
            report.pixels_written
        );
    } else {
        info!("finished {} pixels in {:?}", report.pixels_written, report.elapsed);
    }
    Ok(report)
}

/// A render in progress.
pub struct RenderHandle {
    frame: FrameView,
    progress: ProgressView,
    cancel: CancelToken,
    thread: JoinHandle<Result<RenderReport, RenderError>>,
}

impl RenderHandle {
    /// The framebuffer as it fills in.
    pub fn frame(&self) -> &FrameView {
        &self.frame
    }

    /// The completed-pixel counter.
    pub fn progress(&self) -> &ProgressView {
        &self.progress
    }

    /// Stop dispatching blocks and abandon the ones in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the pipeline has shut down.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Call `observe` with the progress counter every `tick` until the
    /// pipeline shuts down, and once more after that.
    pub fn poll<F: FnMut(&ProgressView)>(&self, tick: Duration, mut observe: F) {
        while !self.is_finished() {
            observe(&self.progress);
            thread::sleep(tick);
        }
        observe(&self.progress);
    }

    /// Wait for the pipeline to shut down.
    pub fn join(self) -> Result<RenderReport, RenderError> {
        self.thread.join().map_err(|_| RenderError::Panicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::EdgePolicy;
    use crate::colour::Colour;
    use crate::sampler::Jitter;
    use num::Complex;

    fn config() -> RenderConfig {
        RenderConfig {
            width: 40,
            height: 30,
            max_iterations: 40,
            samples: 2,
            blocks: 9,
            workers: 3,
            jitter: Jitter::Seeded(11),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        let err = Renderer::new(RenderConfig { workers: 0, ..config() }).unwrap_err();
        assert_eq!(err, ConfigError::NoWorkers);
    }

    #[test]
    fn runs_to_completion() {
        let (report, frame) = Renderer::new(config()).unwrap().run().unwrap();
        assert_eq!(report.pixels_written, 1200);
        assert_eq!(report.blocks_dispatched, 9);
        assert_eq!(report.blocks_completed, 9);
        assert_eq!(report.uncovered_pixels, 0);
        assert!(!report.cancelled);
        assert_eq!((frame.width(), frame.height()), (40, 30));
    }

    #[test]
    fn seeded_renders_are_reproducible() {
        let (_, a) = Renderer::new(config()).unwrap().run().unwrap();
        let single = Renderer::new(RenderConfig { workers: 1, ..config() }).unwrap();
        let (_, b) = single.run().unwrap();
        assert_eq!(a.to_rgba(), b.to_rgba());
    }

    #[test]
    fn bounded_pixel_queue_still_completes() {
        let renderer = Renderer::new(RenderConfig {
            pixel_queue: Some(1),
            ..config()
        })
        .unwrap();
        let (report, _) = renderer.run().unwrap();
        assert_eq!(report.pixels_written, 1200);
    }

    #[test]
    fn truncated_edges_keep_the_background() {
        let renderer = Renderer::new(RenderConfig {
            width: 10,
            height: 7,
            blocks: 9,
            edges: EdgePolicy::Truncate,
            origin: Complex::new(-0.2, -0.2),
            extent: 0.4,
            ..config()
        })
        .unwrap();
        let handle = renderer.start();
        assert_eq!(handle.progress().total(), 54);
        let frame = handle.frame().clone();
        let progress = handle.progress().clone();
        let report = handle.join().unwrap();
        assert_eq!(report.uncovered_pixels, 16);
        assert_eq!(report.pixels_written, 54);
        assert!(progress.is_complete());
        assert_eq!(frame.get(9, 3), Some(Colour::WHITE));
        assert_eq!(frame.get(2, 6), Some(Colour::WHITE));
        assert_eq!(frame.get(0, 0), Some(Colour::BLACK));
    }

    #[test]
    fn cancel_stops_early() {
        let renderer = Renderer::new(RenderConfig {
            width: 256,
            height: 256,
            blocks: 64,
            workers: 1,
            samples: 50,
            max_iterations: 2000,
            ..config()
        })
        .unwrap();
        let handle = renderer.start();
        handle.cancel();
        let report = handle.join().unwrap();
        assert!(report.cancelled);
        assert!(report.blocks_completed < 64);
        assert!(report.pixels_written < 256 * 256);
    }

    #[test]
    fn faulted_block_fails_the_render() {
        let renderer = Renderer::new(config()).unwrap();
        let sampler = renderer.config().sampler();
        let handle = renderer.start_with(move |block, pixels, cancel| {
            if block.id == 4 {
                panic!("boom");
            }
            render_block(&sampler, Jitter::Seeded(11), block, pixels, cancel)
        });
        match handle.join() {
            Err(RenderError::WorkerFault(id, reason)) => {
                assert_eq!(id, 4);
                assert_eq!(reason, "boom");
            }
            other => panic!("expected a worker fault, got {:?}", other),
        }
    }
}
