// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration.  This is the hot path of the whole
//! renderer: every sub-sample of every pixel lands here, so the
//! squares and the cross term are computed once per iteration and
//! the loop leaves on the first escape.

use num::Complex;

/// Once the squared magnitude of an orbit exceeds this, the orbit is
/// known to go to infinity.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// The result of iterating a single point of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// Squared magnitude of the orbit at the moment iteration stopped.
    pub norm_sqr: f64,
    /// Iteration index at which the orbit escaped, or the iteration
    /// limit if it never did.
    pub iterations: usize,
}

impl Escape {
    /// True if the orbit was observed leaving the escape radius.
    pub fn escaped(&self) -> bool {
        self.norm_sqr > ESCAPE_RADIUS_SQR
    }
}

/// Iterate z' = z² + c from z = 0, at most `max_iterations` times.
/// Returns as soon as |z|² exceeds the escape radius; otherwise
/// returns the last squared magnitude seen and `max_iterations`.
pub fn escape_time(c: Complex<f64>, max_iterations: usize) -> Escape {
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let (mut xx, mut yy) = (0.0_f64, 0.0_f64);

    for i in 0..max_iterations {
        xx = x * x;
        yy = y * y;
        let xy = x * y;
        if xx + yy > ESCAPE_RADIUS_SQR {
            return Escape {
                norm_sqr: xx + yy,
                iterations: i,
            };
        }
        x = xx - yy + c.re;
        y = 2.0 * xy + c.im;
    }

    Escape {
        norm_sqr: xx + yy,
        iterations: max_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        let e = escape_time(Complex::new(0.0, 0.0), 500);
        assert_eq!(e.iterations, 500);
        assert_eq!(e.norm_sqr, 0.0);
        assert!(!e.escaped());
    }

    #[test]
    fn far_point_escapes_on_second_check() {
        // z1 = c = 3, |z1|² = 9 is seen at i = 1.
        let e = escape_time(Complex::new(3.0, 0.0), 500);
        assert_eq!(e.iterations, 1);
        assert_eq!(e.norm_sqr, 9.0);
        assert!(e.escaped());
    }

    #[test]
    fn minus_two_is_bounded() {
        let e = escape_time(Complex::new(-2.0, 0.0), 100);
        assert_eq!(e.iterations, 100);
        assert_eq!(e.norm_sqr, 4.0);
    }

    #[test]
    fn zero_limit_returns_immediately() {
        let e = escape_time(Complex::new(10.0, 10.0), 0);
        assert_eq!(e.iterations, 0);
        assert_eq!(e.norm_sqr, 0.0);
    }

    #[test]
    fn early_exit_implies_escape() {
        let limit = 64;
        let mut re = -2.5;
        while re <= 1.5 {
            let mut im = -1.5;
            while im <= 1.5 {
                let e = escape_time(Complex::new(re, im), limit);
                assert!(e.iterations <= limit);
                if e.iterations < limit {
                    assert!(e.norm_sqr > ESCAPE_RADIUS_SQR, "{} {} {:?}", re, im, e);
                }
                im += 0.0625;
            }
            re += 0.0625;
        }
    }

    #[test]
    fn matches_complex_arithmetic() {
        let c = Complex::new(0.3, 0.5);
        let mut z = Complex::new(0.0, 0.0);
        let mut expected = 40;
        for i in 0..40 {
            if z.norm_sqr() > ESCAPE_RADIUS_SQR {
                expected = i;
                break;
            }
            z = z * z + c;
        }
        assert_eq!(escape_time(c, 40).iterations, expected);
    }
}
