// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns raw visit counts into color.

use crate::errors::BuddhabrotError;
use crate::heatmap::{Count, Heatmap};
use itertools::izip;

/// Scales `raw` from `0..=global_max` onto `0..=max_color`, rounding
/// down.  Integer arithmetic throughout, so the brightest pixel always
/// lands exactly on `max_color`.  A zero `global_max` means nothing
/// was ever plotted; every value then maps to black.
pub fn normalize(raw: Count, global_max: Count, max_color: u8) -> u8 {
    if global_max == 0 {
        return 0;
    }
    let raw = raw.min(global_max);
    ((u128::from(raw) * u128::from(max_color)) / u128::from(global_max)) as u8
}

/// An interleaved 8-bit RGB image, row-major, ready for an encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbRaster {
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// `width * height` red, green, blue triples.
    pub pixels: Vec<u8>,
    /// The brightest value any sample may take; the image header says so.
    pub max_color: u8,
}

/// Normalizes three channel heatmaps against one shared maximum and
/// weaves them into a single raster.
pub fn colorize(
    red: &Heatmap,
    green: &Heatmap,
    blue: &Heatmap,
    global_max: Count,
    max_color: u8,
) -> Result<RgbRaster, BuddhabrotError> {
    let (width, height) = (red.width(), red.height());
    for other in &[green, blue] {
        if other.width() != width || other.height() != height {
            return Err(BuddhabrotError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                width: other.width(),
                height: other.height(),
            });
        }
    }

    let mut pixels = Vec::with_capacity(width * height * 3);
    for (r, g, b) in izip!(red.cells(), green.cells(), blue.cells()) {
        pixels.push(normalize(*r, global_max, max_color));
        pixels.push(normalize(*g, global_max, max_color));
        pixels.push(normalize(*b, global_max, max_color));
    }

    Ok(RgbRaster {
        width,
        height,
        pixels,
        max_color,
    })
}
