// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pixel to complex-plane mapping.  A window on the complex plane is
//! described by its top left corner (the origin) and its vertical
//! extent; the horizontal extent follows from the image's aspect
//! ratio.
use num::Complex;

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels, plus a sub-pixel offset, onto the complex plane.  The
/// window is `extent` tall; pixels are square, so its width is
/// `extent` scaled by the image's aspect ratio.
#[derive(Clone, Debug)]
pub struct PlaneMapper {
    // Side of one pixel on the complex plane.
    step: f64,
    /// The complex number that pixel 0,0 (with no offset) maps to.
    pub origin: Complex<f64>,
    /// Height of the window on the complex plane.
    pub extent: f64,
}

impl PlaneMapper {
    /// A window `extent` tall spread over `height` rows of pixels.
    /// Height and extent are validated by the render configuration
    /// before a mapper is ever built.
    pub fn new(height: usize, origin: Complex<f64>, extent: f64) -> PlaneMapper {
        PlaneMapper {
            step: extent / (height as f64),
            origin,
            extent,
        }
    }

    /// Given a pixel and an offset inside it (each component on
    /// [0, 1)), return the point on the complex plane it covers.
    pub fn pixel_to_point(&self, pixel: &Pixel, offset: (f64, f64)) -> Complex<f64> {
        Complex::new(
            self.step * ((pixel.0 as f64) + offset.0) + self.origin.re,
            self.step * ((pixel.1 as f64) + offset.1) + self.origin.im,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_pixel_maps_to_origin() {
        let pm = PlaneMapper::new(4, Complex::new(-2.0, -1.0), 2.0);
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0), (0.0, 0.0)), Complex::new(-2.0, -1.0));
    }

    #[test]
    fn pixel_to_point_on_square_plane() {
        let pm = PlaneMapper::new(4, Complex::new(-2.0, -2.0), 4.0);
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2), (0.0, 0.0)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(1, 3), (0.5, 0.5)), Complex::new(-0.5, 1.5));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4), (0.0, 0.0)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn wide_plane_keeps_pixels_square() {
        let pm = PlaneMapper::new(100, Complex::new(0.0, 0.0), 1.0);
        let p = pm.pixel_to_point(&Pixel(10, 10), (0.0, 0.0));
        assert_eq!(p, Complex::new(0.1, 0.1));
        assert_eq!(pm.pixel_to_point(&Pixel(200, 0), (0.0, 0.0)).re, 2.0);
    }

    #[test]
    fn offsets_stay_inside_the_pixel() {
        let pm = PlaneMapper::new(8, Complex::new(-1.0, -1.0), 2.0);
        let near = pm.pixel_to_point(&Pixel(3, 5), (0.0, 0.0));
        let far = pm.pixel_to_point(&Pixel(4, 6), (0.0, 0.0));
        for &offset in &[(0.25, 0.75), (0.5, 0.999)] {
            let p = pm.pixel_to_point(&Pixel(3, 5), offset);
            assert!(p.re >= near.re && p.re < far.re, "{}", p);
            assert!(p.im >= near.im && p.im < far.im, "{}", p);
        }
    }
}
