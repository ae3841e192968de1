// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The bounded worker pool.
//!
//! The pool starts with one token per worker.  The dispatch loop
//! waits for a token, then for a block, and hands both to a fresh
//! scoped thread; the thread gives the token back when its block is
//! done.  So at most `size` blocks are ever in flight, and the pool
//! stays saturated until the work queue closes.  Once it has, the
//! loop waits for the stragglers and drops its pixel sender, which
//! closes the pixel stream for the sink.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, error, trace};

use crate::blocks::WorkBlock;
use crate::cancel::CancelToken;
use crate::error::RenderError;
use crate::sampler::PixelResult;

/// How a worker finished its block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Every pixel was emitted.
    Completed,
    /// The cancel token was raised part way through.
    Cancelled,
    /// The worker failed; the string says why.
    Faulted(String),
}

/// One per dispatched block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
    /// The block the worker was given.
    pub block: WorkBlock,
    /// Pixels emitted onto the stream.
    pub pixels: usize,
    /// How it ended.
    pub outcome: BlockOutcome,
}

impl BlockReport {
    /// True for a finished block.
    pub fn is_completed(&self) -> bool {
        self.outcome == BlockOutcome::Completed
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// A fixed number of concurrently running block workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// `size` is the number of blocks that may be computed at once.
    pub fn new(size: usize) -> Self {
        WorkerPool { size }
    }

    /// Run `render` over every block from the queue until the queue
    /// closes or `cancel` is raised.  Reports come back in dispatch
    /// order.  A panicking worker is reported as faulted and raises
    /// `cancel` so the rest of the run winds down.
    pub fn run<F>(
        &self,
        blocks: Receiver<WorkBlock>,
        pixels: Sender<PixelResult>,
        cancel: &CancelToken,
        render: F,
    ) -> Result<Vec<BlockReport>, RenderError>
    where
        F: Fn(&WorkBlock, &Sender<PixelResult>, &CancelToken) -> BlockReport + Sync,
    {
        let size = self.size.max(1);
        let (tokens, available) = bounded::<()>(size);
        for _ in 0..size {
            if tokens.send(()).is_err() {
                break;
            }
        }

        let render = &render;
        let outcome = crossbeam::scope(|scope| {
            let mut workers = Vec::new();
            for () in available.iter() {
                if cancel.is_cancelled() {
                    debug!("cancelled; dispatch stopped after {} blocks", workers.len());
                    break;
                }
                let block = match blocks.recv() {
                    Ok(block) => block,
                    Err(_) => break,
                };
                debug!(
                    "dispatching block {} ({}..{} x {}..{})",
                    block.id, block.x_start, block.x_end, block.y_start, block.y_end
                );

                let tokens = tokens.clone();
                let pixels = pixels.clone();
                let cancel = cancel.clone();
                let handle = scope.spawn(move |_| {
                    let attempt =
                        panic::catch_unwind(AssertUnwindSafe(|| render(&block, &pixels, &cancel)));
                    let report = match attempt {
                        Ok(report) => report,
                        Err(cause) => BlockReport {
                            block,
                            pixels: 0,
                            outcome: BlockOutcome::Faulted(panic_message(&*cause)),
                        },
                    };
                    if let BlockOutcome::Faulted(ref reason) = report.outcome {
                        error!("block {} faulted: {}", block.id, reason);
                        cancel.cancel();
                    }
                    trace!("block {} returned its token", block.id);
                    let _ = tokens.send(());
                    report
                });
                workers.push((block, handle));
            }

            workers
                .into_iter()
                .map(|(block, handle)| {
                    handle.join().unwrap_or_else(|cause| BlockReport {
                        block,
                        pixels: 0,
                        outcome: BlockOutcome::Faulted(panic_message(&*cause)),
                    })
                })
                .collect::<Vec<BlockReport>>()
        });
        drop(pixels);
        outcome.map_err(|_| RenderError::Panicked)
    }
}
