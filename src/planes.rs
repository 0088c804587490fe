// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, a validated rectangle on the complex plane,
//! and the PlaneMapper, which relates that rectangle to the integral
//! plane of pixels in the output image.
//!
//! The real axis runs down the rows of the image and the imaginary
//! axis runs across the columns, which stands the Buddha upright.

use crate::errors::BuddhabrotError;
use num::Complex;

/// Describes the lower-left corner and upper-right corner of the
/// sampled region of the complex plane.  Can only be built through
/// `Viewport::new`, so `min` is always strictly below and to the left
/// of `max`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    min: Complex<f64>,
    max: Complex<f64>,
}

impl Viewport {
    /// Validates the two corners.
    pub fn new(min: Complex<f64>, max: Complex<f64>) -> Result<Viewport, BuddhabrotError> {
        let corners = [min.re, min.im, max.re, max.im];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(BuddhabrotError::viewport(format!(
                "corners must be finite, got {} and {}",
                min, max
            )));
        }

        if min.re >= max.re {
            return Err(BuddhabrotError::viewport(format!(
                "the minimum real part {} is not below the maximum {}",
                min.re, max.re
            )));
        }

        if min.im >= max.im {
            return Err(BuddhabrotError::viewport(format!(
                "the minimum imaginary part {} is not below the maximum {}",
                min.im, max.im
            )));
        }

        Ok(Viewport { min, max })
    }

    /// The lower-left corner.
    pub fn min(&self) -> Complex<f64> {
        self.min
    }

    /// The upper-right corner.
    pub fn max(&self) -> Complex<f64> {
        self.max
    }

    /// Inclusive on all four sides.
    pub fn contains(&self, point: &Complex<f64>) -> bool {
        point.re >= self.min.re
            && point.re <= self.max.re
            && point.im >= self.min.im
            && point.im <= self.max.im
    }
}

/// The -2-1.5i to 1+1.5i window the reference renders use.
impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            min: Complex::new(-2.0, -1.5),
            max: Complex::new(1.0, 1.5),
        }
    }
}

/// Rescales a coordinate in `[min, max]` onto `[0, dimension)`.  Values
/// past `max` are not clamped and may land on or beyond `dimension`;
/// values under `min` come out negative.  The exact maximum (and any
/// rounding at it) is held to the last index.
fn scale_to_index(value: f64, min: f64, max: f64, dimension: usize) -> i64 {
    let index = ((value - min) * (dimension as f64) / (max - min)).floor() as i64;
    if value <= max && dimension > 0 {
        index.min(dimension as i64 - 1)
    } else {
        index
    }
}

/// Maps the real part of a point to an image row.
pub fn row_from_real(value: f64, min: f64, max: f64, image_height: usize) -> i64 {
    scale_to_index(value, min, max, image_height)
}

/// Maps the imaginary part of a point to an image column.
pub fn col_from_imaginary(value: f64, min: f64, max: f64, image_width: usize) -> i64 {
    scale_to_index(value, min, max, image_width)
}

/// A pixel address in the output image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel {
    /// Derived from the real part.
    pub row: usize,
    /// Derived from the imaginary part.
    pub col: usize,
}

/// Contains the definitions of two planes: an integral plane of
/// `width` x `height` pixels, and the viewport on the complex plane.
/// Maps points from one to the other.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    viewport: Viewport,
    width: usize,
    height: usize,
}

impl PlaneMapper {
    /// Binds an image size to a viewport.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> PlaneMapper {
        PlaneMapper {
            viewport,
            width,
            height,
        }
    }

    /// The complex side of the mapping.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Image width, in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height, in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if either side of the image is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given a point on the complex plane, find the pixel it falls in,
    /// or `None` if it lies outside the viewport.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        if self.is_empty() || !self.viewport.contains(point) {
            return None;
        }
        let (min, max) = (self.viewport.min, self.viewport.max);
        let row = row_from_real(point.re, min.re, max.re, self.height);
        let col = col_from_imaginary(point.im, min.im, max.im, self.width);
        if row < 0 || col < 0 {
            return None;
        }
        Some(Pixel {
            row: row as usize,
            col: col as usize,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: usize) -> PlaneMapper {
        let viewport = Viewport::new(Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap();
        PlaneMapper::new(side, side, viewport)
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        assert!(Viewport::new(Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0)).is_err());
        assert!(Viewport::new(Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0)).is_err());
    }

    #[test]
    fn viewport_fails_on_flat_shape() {
        assert!(Viewport::new(Complex::new(0.0, -1.0), Complex::new(0.0, 1.0)).is_err());
        assert!(Viewport::new(Complex::new(-1.0, 0.5), Complex::new(1.0, 0.5)).is_err());
    }

    #[test]
    fn viewport_fails_on_nan() {
        assert!(Viewport::new(Complex::new(std::f64::NAN, -1.0), Complex::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        assert!(Viewport::new(Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).is_ok());
    }

    #[test]
    fn viewport_bounds_are_inclusive() {
        let viewport = Viewport::default();
        assert!(viewport.contains(&Complex::new(-2.0, -1.5)));
        assert!(viewport.contains(&Complex::new(1.0, 1.5)));
        assert!(viewport.contains(&Complex::new(-0.5, 0.0)));
        assert!(!viewport.contains(&Complex::new(1.0000001, 0.0)));
        assert!(!viewport.contains(&Complex::new(0.0, -1.5000001)));
    }

    #[test]
    fn mapping_hits_both_ends() {
        assert_eq!(row_from_real(-2.0, -2.0, 1.0, 400), 0);
        assert_eq!(row_from_real(1.0, -2.0, 1.0, 400), 399);
        assert_eq!(col_from_imaginary(-1.5, -1.5, 1.5, 400), 0);
        assert_eq!(col_from_imaginary(1.5, -1.5, 1.5, 400), 399);
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut last = -1;
        let mut value = -2.0;
        while value <= 1.0 {
            let row = row_from_real(value, -2.0, 1.0, 37);
            assert!(row >= last);
            assert!(row < 37);
            last = row;
            value += 0.001;
        }
    }

    #[test]
    fn mapping_does_not_clamp_outside_values() {
        assert_eq!(row_from_real(-3.0, -2.0, 2.0, 4), -1);
        assert_eq!(col_from_imaginary(3.0, -2.0, 2.0, 4), 5);
    }

    #[test]
    fn point_to_pixel_on_mixed_planes() {
        let pm = square(4);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel { row: 2, col: 2 }));
        assert_eq!(pm.point_to_pixel(&Complex::new(-2.0, -2.0)), Some(Pixel { row: 0, col: 0 }));
        assert_eq!(pm.point_to_pixel(&Complex::new(2.0, 2.0)), Some(Pixel { row: 3, col: 3 }));
        assert_eq!(pm.point_to_pixel(&Complex::new(-1.0, 1.5)), Some(Pixel { row: 1, col: 3 }));
    }

    #[test]
    fn point_to_pixel_maps_on_large_mixed_planes() {
        let pm = square(640);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel { row: 320, col: 320 }));
        assert_eq!(pm.point_to_pixel(&Complex::new(1.0, 2.0)), Some(Pixel { row: 480, col: 639 }));
    }

    #[test]
    fn point_to_pixel_rejects_outside_points() {
        let pm = square(4);
        assert_eq!(pm.point_to_pixel(&Complex::new(2.5, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, -2.5)), None);
    }

    #[test]
    fn real_axis_runs_down_the_rows() {
        let viewport = Viewport::new(Complex::new(0.0, 0.0), Complex::new(1.0, 1.0)).unwrap();
        let pm = PlaneMapper::new(10, 2, viewport);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.75, 0.25)), Some(Pixel { row: 1, col: 2 }));
    }

    #[test]
    fn empty_plane_maps_nothing() {
        let pm = PlaneMapper::new(0, 4, Viewport::default());
        assert!(pm.is_empty());
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), None);
    }
}
