#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Nebulabrot renderer
//!
//! The Buddhabrot is a variant of the Mandelbrot set that explores
//! where points *go* rather than how fast they go there.  Pick a
//! random point `c`, iterate `z = z * z + c` from zero, and if the
//! orbit flies off to infinity within some budget of iterations, map
//! every `z` it passed through to the nearest pixel and bump that
//! pixel by one.  After enough samples the density of those visits
//! draws a seated figure, hence the name.
//!
//! The Nebulabrot does this three times with different iteration
//! budgets and uses the three densities as the red, green and blue
//! channels.  Short budgets pick up the quick escapers and trace the
//! body; long budgets pick up the slow ones, which cling to the
//! boundary of the set.  All three channels are scaled against one
//! shared maximum so that their brightness stays comparable.
//!
//! The pieces, from the bottom up: `orbits` computes escape
//! trajectories, `planes` maps the complex plane onto pixels,
//! `heatmap` counts visits, `generator` drives the random sampling,
//! `color` normalizes counts into color, and `render` ties it all
//! together and writes a PPM.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;

pub mod color;
pub mod config;
pub mod errors;
pub mod generator;
pub mod heatmap;
pub mod orbits;
pub mod planes;
pub mod progress;
pub mod render;

pub use color::{colorize, normalize, RgbRaster};
pub use config::{Channel, Config, Seed};
pub use errors::BuddhabrotError;
pub use generator::HeatmapGenerator;
pub use heatmap::{Count, GlobalMax, Heatmap};
pub use orbits::{trajectory, ESCAPE_THRESHOLD};
pub use planes::{col_from_imaginary, row_from_real, Pixel, PlaneMapper, Viewport};
pub use progress::{LogProgress, NullProgress, ProgressSink};
pub use render::{render, sample_channels, save, save_or_discard, write_ppm, Channels};
