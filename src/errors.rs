// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by every stage of the renderer.

use failure::Fail;
use std::io;

/// Everything that can stop a render.  Escaping points that land
/// outside the viewport and bounded samples are not errors; they are
/// simply dropped.
#[derive(Debug, Fail)]
pub enum BuddhabrotError {
    /// The viewport corners do not describe a rectangle with a
    /// positive, finite extent on both axes.
    #[fail(display = "invalid viewport: {}", reason)]
    InvalidViewport {
        /// What was wrong with the corners.
        reason: String,
    },

    /// Some other configuration value is out of range.
    #[fail(display = "invalid configuration: {}", reason)]
    InvalidConfig {
        /// What was wrong with the value.
        reason: String,
    },

    /// A channel could visit a single pixel more times than a counter
    /// can hold.
    #[fail(
        display = "channel {}: {} samples of {} iterations could overflow a pixel counter",
        channel, samples, iterations
    )]
    CounterOverflow {
        /// Label of the offending channel.
        channel: String,
        /// Samples requested for it.
        samples: usize,
        /// Its iteration budget.
        iterations: usize,
    },

    /// Two heatmaps that must line up do not.
    #[fail(
        display = "heatmap dimensions differ: {}x{} against {}x{}",
        expected_width, expected_height, width, height
    )]
    DimensionMismatch {
        /// Width of the receiving heatmap.
        expected_width: usize,
        /// Height of the receiving heatmap.
        expected_height: usize,
        /// Width of the other heatmap.
        width: usize,
        /// Height of the other heatmap.
        height: usize,
    },

    /// A sampling thread died before handing back its heatmap.
    #[fail(display = "a sampling thread panicked while rendering the {} channel", channel)]
    WorkerPanicked {
        /// Label of the channel being sampled.
        channel: String,
    },

    /// The output could not be opened or written.
    #[fail(display = "could not write {}: {}", path, cause)]
    Io {
        /// Where we were writing.
        path: String,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },
}

impl BuddhabrotError {
    pub(crate) fn config<S: Into<String>>(reason: S) -> Self {
        BuddhabrotError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn viewport<S: Into<String>>(reason: S) -> Self {
        BuddhabrotError::InvalidViewport {
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure with the destination it concerned.
    pub fn io<S: Into<String>>(path: S, cause: io::Error) -> Self {
        BuddhabrotError::Io {
            path: path.into(),
            cause,
        }
    }
}
