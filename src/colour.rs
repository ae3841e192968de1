// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colouring.  Points still inside the set (as far as we could tell)
//! are black; escaped points get a fully saturated hue derived from
//! how long they took to escape and how far out they were when they
//! did.

use num::clamp;

use crate::escape::Escape;

/// Hue assigned to an orbit that escaped instantly.
pub const HUE_BASE: f64 = 1.0;

/// How far around the colour wheel each unit of
/// `iterations * norm_sqr` moves the hue.
pub const HUE_SCALE: f64 = 0.01;

/// An 8-bit-per-channel RGBA colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Colour {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Colour {
    /// Colour of points inside the set.
    pub const BLACK: Colour = Colour::opaque(0, 0, 0);
    /// Background fill of a fresh framebuffer.
    pub const WHITE: Colour = Colour::opaque(255, 255, 255);

    /// A fully opaque colour.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Colour {
        Colour { r, g, b, a: 255 }
    }

    /// Packs the colour into a single word, red in the high byte.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of `to_u32`.
    pub fn from_u32(word: u32) -> Colour {
        let [r, g, b, a] = word.to_be_bytes();
        Colour { r, g, b, a }
    }
}

fn channel(v: f64) -> u8 {
    clamp((v * 255.0).round(), 0.0, 255.0) as u8
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// The standard HSL to RGB conversion.  All three inputs are on the
/// unit interval; the result is opaque.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Colour {
    if s == 0.0 {
        let v = channel(l);
        return Colour::opaque(v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Colour::opaque(
        channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        channel(hue_to_rgb(p, q, h)),
        channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

// rem_euclid rounds tiny negative inputs up to exactly 1.0.
fn wrap_unit(v: f64) -> f64 {
    let wrapped = v.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Hue on [0, 1) for an escaped orbit.
pub fn escape_hue(escape: &Escape) -> f64 {
    wrap_unit(HUE_BASE - HUE_SCALE * (escape.iterations as f64) * escape.norm_sqr)
}

/// Map an escape result to a colour.
pub fn colourize(escape: &Escape) -> Colour {
    if !escape.escaped() {
        return Colour::BLACK;
    }
    hsl_to_rgb(escape_hue(escape), 1.0, 0.5)
}
