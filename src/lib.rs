#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Block-parallel Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which the orbit of z' = z² + c, started at zero, stays bounded.
//! Points outside the set escape, and how quickly they escape is what
//! gives the picture its colour.
//!
//! This crate renders the set as a pipeline.  The image is cut into a
//! square grid of blocks and the blocks are queued; a bounded pool of
//! worker threads takes them one at a time, supersamples every pixel
//! with randomly jittered points, and streams the finished pixels to a
//! single sink.  The sink owns the framebuffer and a progress counter;
//! anyone holding a `FrameView` or `ProgressView` can watch the image
//! fill in while the render runs.
//!
//! ```no_run
//! use mandelpool::{RenderConfig, Renderer};
//!
//! let renderer = Renderer::new(RenderConfig::default()).unwrap();
//! let (report, frame) = renderer.run().unwrap();
//! assert_eq!(report.pixels_written, frame.width() * frame.height());
//! ```

pub mod blocks;
pub mod cancel;
pub mod colour;
pub mod config;
pub mod error;
pub mod escape;
pub mod framebuffer;
pub mod planes;
pub mod progress;
pub mod render;
pub mod sampler;
pub mod scheduler;
pub mod sink;
pub mod worker;

pub use blocks::{EdgePolicy, Partition, WorkBlock};
pub use cancel::CancelToken;
pub use colour::Colour;
pub use config::RenderConfig;
pub use error::{ConfigError, RenderError};
pub use escape::{escape_time, Escape};
pub use framebuffer::FrameView;
pub use planes::{Pixel, PlaneMapper};
pub use progress::ProgressView;
pub use render::{RenderHandle, RenderReport, Renderer};
pub use sampler::{Jitter, PixelResult, PixelSampler};
pub use scheduler::{BlockOutcome, BlockReport, WorkerPool};
