// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Random sampling of the viewport into one channel heatmap.
//!
//! Every worker thread draws its own share of the samples from its own
//! seeded generator and plots into its own private heatmap, so nothing
//! but the progress counter is contended while sampling.  When all of
//! them are done the private heatmaps are summed into one.  For a
//! given seed and thread count the result is always the same.

use crossbeam::thread::ScopedJoinHandle;
use log::debug;
use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::{stream_seed, Channel};
use crate::errors::BuddhabrotError;
use crate::heatmap::{GlobalMax, Heatmap};
use crate::orbits::{trace, ESCAPE_THRESHOLD, ORBIT_RESERVE};
use crate::planes::PlaneMapper;
use crate::progress::{ProgressSink, Ticker, FIRST_REPORT, REPORT_INTERVAL};

/// Samples are counted towards progress in batches of this size.
const PROGRESS_BATCH: usize = 4096;

/// Splits `samples` as evenly as possible over `workers`; the first
/// few workers take one extra sample each if it does not divide.
fn shares(samples: usize, workers: usize) -> Vec<usize> {
    let (each, extra) = (samples / workers, samples % workers);
    (0..workers)
        .map(|worker| each + if worker < extra { 1 } else { 0 })
        .collect()
}

/// Holds the planes and the knobs that stay fixed for a whole render.
/// Once built, it can generate any number of channels.
pub struct HeatmapGenerator<'a> {
    plane: &'a PlaneMapper,
    threads: usize,
    bailout: f64,
    first_report: Duration,
    report_interval: Duration,
}

impl<'a> HeatmapGenerator<'a> {
    /// Samples onto `plane` using `threads` workers (at least one).
    pub fn new(plane: &'a PlaneMapper, threads: usize) -> Self {
        HeatmapGenerator {
            plane,
            threads: threads.max(1),
            bailout: ESCAPE_THRESHOLD,
            first_report: FIRST_REPORT,
            report_interval: REPORT_INTERVAL,
        }
    }

    /// Overrides the escape threshold on the squared magnitude.
    pub fn with_bailout(mut self, bailout: f64) -> Self {
        self.bailout = bailout;
        self
    }

    /// Reports progress first after `first`, then every `every`.
    pub fn with_progress_intervals(mut self, first: Duration, every: Duration) -> Self {
        self.first_report = first;
        self.report_interval = every;
        self
    }

    /// Draws `channel.samples` random points from the viewport, plots
    /// the in-viewport part of every escaping orbit, and returns the
    /// resulting heatmap.  Its maximum is folded into `global_max`.
    pub fn generate(
        &self,
        channel: &Channel,
        seed: u64,
        global_max: &GlobalMax,
        progress: &dyn ProgressSink,
    ) -> Result<Heatmap, BuddhabrotError> {
        let taken = AtomicUsize::new(0);
        let shares = shares(channel.samples, self.threads);
        let panicked = || BuddhabrotError::WorkerPanicked {
            channel: channel.label.clone(),
        };

        let partials = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Heatmap>> = shares
                .iter()
                .enumerate()
                .map(|(worker, &share)| {
                    let taken = &taken;
                    // One reporter is enough; the counter is shared.
                    let reporter = if worker == 0 { Some(progress) } else { None };
                    spawner.spawn(move |_| {
                        self.sample(
                            channel,
                            share,
                            stream_seed(seed, worker as u64),
                            taken,
                            reporter,
                        )
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<Heatmap>, _>>()
        })
        .map_err(|_| panicked())?
        .map_err(|_| panicked())?;

        let mut partials = partials.into_iter();
        let mut heatmap = partials
            .next()
            .unwrap_or_else(|| Heatmap::new(self.plane.width(), self.plane.height()));
        for partial in partials {
            heatmap.merge(&partial)?;
        }

        debug!(
            "{} channel: {} visits, brightest pixel {}",
            channel.label,
            heatmap.total(),
            heatmap.max()
        );
        global_max.observe(heatmap.max());
        Ok(heatmap)
    }

    /// One worker's share of the sampling.
    fn sample(
        &self,
        channel: &Channel,
        share: usize,
        seed: u64,
        taken: &AtomicUsize,
        reporter: Option<&dyn ProgressSink>,
    ) -> Heatmap {
        let viewport = self.plane.viewport();
        let (min, max) = (viewport.min(), viewport.max());
        let real = Uniform::new(min.re, max.re);
        let imaginary = Uniform::new(min.im, max.im);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ticker = Ticker::with_intervals(self.first_report, self.report_interval);

        let mut heatmap = Heatmap::new(self.plane.width(), self.plane.height());
        let mut orbit: Vec<Complex<f64>> = Vec::with_capacity(channel.iterations.min(ORBIT_RESERVE));

        for index in 0..share {
            if index > 0 && index % PROGRESS_BATCH == 0 {
                let so_far = taken.fetch_add(PROGRESS_BATCH, Ordering::Relaxed) + PROGRESS_BATCH;
                if let Some(sink) = reporter {
                    if ticker.due() {
                        sink.report(&channel.label, so_far, channel.samples);
                    }
                }
            }

            let c = Complex::new(real.sample(&mut rng), imaginary.sample(&mut rng));
            if !trace(c, channel.iterations, self.bailout, &mut orbit) {
                continue;
            }
            for z in &orbit {
                if let Some(pixel) = self.plane.point_to_pixel(z) {
                    heatmap.increment(pixel.row, pixel.col);
                }
            }
        }
        heatmap
    }
}
