// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visit-count histograms.
//!
//! Each channel gets a `Heatmap`: one counter per output pixel,
//! bumped every time an escaping orbit passes through that pixel.
//! Because the three channels are normalized against one another, the
//! largest count across all of them is tracked separately in a
//! `GlobalMax`.

use crate::errors::BuddhabrotError;
use std::sync::atomic::{AtomicU64, Ordering};

/// The counter type.  A channel may add at most `samples * iterations`
/// visits, and configuration validation refuses anything that would
/// not fit in a `u64`, so a pixel can never wrap.
pub type Count = u64;

/// A `height` x `width` grid of visit counts, stored row-major in a
/// single allocation, plus the largest count it holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    width: usize,
    height: usize,
    cells: Vec<Count>,
    max: Count,
}

impl Heatmap {
    /// A zeroed heatmap.
    pub fn new(width: usize, height: usize) -> Heatmap {
        Heatmap {
            width,
            height,
            cells: vec![0; width * height],
            max: 0,
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The largest count in this heatmap.
    pub fn max(&self) -> Count {
        self.max
    }

    /// The raw counts, row-major.
    pub fn cells(&self) -> &[Count] {
        &self.cells
    }

    /// The sum of every count, which is the number of increments made.
    pub fn total(&self) -> Count {
        self.cells.iter().sum()
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "pixel ({}, {}) outside a {}x{} heatmap",
            row,
            col,
            self.width,
            self.height
        );
        row * self.width + col
    }

    /// The count at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Count {
        self.cells[self.offset(row, col)]
    }

    /// Records one visit to `(row, col)` and returns the new count.
    pub fn increment(&mut self, row: usize, col: usize) -> Count {
        let offset = self.offset(row, col);
        self.cells[offset] += 1;
        let count = self.cells[offset];
        if count > self.max {
            self.max = count;
        }
        count
    }

    /// Adds another heatmap of the same shape into this one, cell by
    /// cell.  The maximum of a sum is not the sum of the maxima, so it
    /// is recomputed.
    pub fn merge(&mut self, other: &Heatmap) -> Result<(), BuddhabrotError> {
        if self.width != other.width || self.height != other.height {
            return Err(BuddhabrotError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        for (cell, extra) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell += *extra;
        }
        self.max = self.cells.iter().cloned().max().unwrap_or(0);
        Ok(())
    }
}

/// The running maximum shared by all channels of one render.  Safe to
/// update from several threads.
#[derive(Debug, Default)]
pub struct GlobalMax(AtomicU64);

impl GlobalMax {
    /// Starts at zero.
    pub fn new() -> GlobalMax {
        GlobalMax(AtomicU64::new(0))
    }

    /// Raises the maximum to `value` if `value` is larger.
    pub fn observe(&self, value: Count) {
        self.0.fetch_max(value, Ordering::SeqCst);
    }

    /// The largest value observed so far.
    pub fn get(&self) -> Count {
        self.0.load(Ordering::SeqCst)
    }
}
