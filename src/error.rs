// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  A render either fails to start, because its
//! configuration is unusable, or fails part way through because a
//! worker did.

use failure::Fail;

/// Problems found while validating a render configuration.  All of
/// them are detected before any work is dispatched.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    #[fail(display = "image dimensions must be positive, got {}x{}", _0, _1)]
    EmptyImage(usize, usize),
    /// Fewer blocks requested than one.
    #[fail(display = "at least one work block is required")]
    NoBlocks,
    /// The grid dimension is larger than the image, so blocks would
    /// have no pixels.
    #[fail(
        display = "a {}x{} block grid does not fit a {}x{} image",
        _0, _0, _1, _2
    )]
    GridTooFine(usize, usize, usize),
    /// No samples per pixel.
    #[fail(display = "at least one sample per pixel is required")]
    NoSamples,
    /// Iteration limit of zero.
    #[fail(display = "the iteration limit must be positive")]
    NoIterations,
    /// Empty worker pool.
    #[fail(display = "at least one worker is required")]
    NoWorkers,
    /// Vertical extent that is not a positive, finite number.
    #[fail(display = "the plane extent must be positive and finite, got {}", _0)]
    BadExtent(f64),
    /// Origin with a NaN or infinite component.
    #[fail(display = "the plane origin must be finite, got {},{}", _0, _1)]
    BadOrigin(f64, f64),
    /// Fixed jitter offsets outside the unit square.
    #[fail(display = "fixed jitter offsets must lie in [0, 1), got {},{}", _0, _1)]
    BadJitter(f64, f64),
    /// A bounded pixel queue with no room.
    #[fail(display = "the pixel queue capacity must be positive")]
    EmptyPixelQueue,
}

/// Why a render did not complete.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The configuration was rejected.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(#[cause] ConfigError),
    /// A worker failed while computing a block.
    #[fail(display = "worker failed on block {}: {}", _0, _1)]
    WorkerFault(usize, String),
    /// A pipeline thread panicked outside any worker.
    #[fail(display = "a render thread panicked")]
    Panicked,
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> RenderError {
        RenderError::Config(e)
    }
}
