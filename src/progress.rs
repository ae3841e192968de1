// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The completed-pixel counter.  Same shape as the framebuffer: one
//! writer that only ever adds, any number of pollers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Counter {
    completed: AtomicUsize,
    total: usize,
}

/// A zeroed counter expecting `total` pixels.
pub fn counter(total: usize) -> (ProgressWriter, ProgressView) {
    let counter = Arc::new(Counter {
        completed: AtomicUsize::new(0),
        total,
    });
    (ProgressWriter(counter.clone()), ProgressView(counter))
}

/// The increment handle, owned by the pixel sink.
pub struct ProgressWriter(Arc<Counter>);

impl ProgressWriter {
    /// Count one more finished pixel.
    pub fn advance(&mut self) {
        self.0.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// A read handle; clone freely.
#[derive(Clone)]
pub struct ProgressView(Arc<Counter>);

impl ProgressView {
    /// Pixels written so far.
    pub fn completed(&self) -> usize {
        self.0.completed.load(Ordering::Relaxed)
    }

    /// Pixels the render will write in total.
    pub fn total(&self) -> usize {
        self.0.total
    }

    /// Whole percent complete, 0 to 100.
    pub fn percent(&self) -> usize {
        if self.0.total == 0 {
            return 100;
        }
        100 * self.completed() / self.0.total
    }

    /// True once every expected pixel has been written.
    pub fn is_complete(&self) -> bool {
        self.completed() >= self.0.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_to_total() {
        let (mut writer, view) = counter(4);
        assert_eq!(view.completed(), 0);
        assert_eq!(view.percent(), 0);
        assert!(!view.is_complete());
        for _ in 0..3 {
            writer.advance();
        }
        assert_eq!(view.completed(), 3);
        assert_eq!(view.percent(), 75);
        writer.advance();
        assert!(view.is_complete());
        assert_eq!(view.percent(), 100);
    }

    #[test]
    fn empty_render_is_complete() {
        let (_writer, view) = counter(0);
        assert!(view.is_complete());
        assert_eq!(view.percent(), 100);
    }
}
