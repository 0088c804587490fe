// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything a render needs to know, with the defaults of the
//! reference run, plus the small parsers the command line uses to fill
//! it in.

use crate::errors::BuddhabrotError;
use crate::orbits::ESCAPE_THRESHOLD;
use crate::planes::Viewport;
use num::Complex;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Image width and height of the reference run.
pub const DEFAULT_SIZE: usize = 400;

/// Samples taken per output pixel, per channel, in the reference run.
pub const DEFAULT_DENSITY: usize = 100;

/// One of the three heatmaps: what to call it, how long to chase each
/// orbit, and how many orbits to chase.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Used in progress reports and logs.
    pub label: String,
    /// The iteration budget; shorter budgets pick up the fast escapers.
    pub iterations: usize,
    /// How many random points to draw.
    pub samples: usize,
}

impl Channel {
    /// Builds a channel.
    pub fn new<S: Into<String>>(label: S, iterations: usize, samples: usize) -> Channel {
        Channel {
            label: label.into(),
            iterations,
            samples,
        }
    }
}

/// Where the random number generator gets its seed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Seed {
    /// Always the same image for the same configuration.
    Fixed(u64),
    /// Seeded from the wall clock, a different image every run.
    Clock,
}

impl Seed {
    /// Picks the concrete seed for this run.
    pub fn resolve(&self) -> u64 {
        match *self {
            Seed::Fixed(seed) => seed,
            Seed::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or(0),
        }
    }
}

/// Derives an independent seed for one stream (a channel, or a worker
/// within a channel) from a base seed.
pub fn stream_seed(base: u64, stream: u64) -> u64 {
    base ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// The full description of a render.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The region of the complex plane to sample and draw.
    pub viewport: Viewport,
    /// Output columns.
    pub width: usize,
    /// Output rows.
    pub height: usize,
    /// Red, green and blue, in that order.
    pub channels: [Channel; 3],
    /// The brightest value a color sample can take.
    pub max_color: u8,
    /// Sampling threads per channel.
    pub threads: usize,
    /// Seed policy for the random samples.
    pub seed: Seed,
    /// Escape threshold on the squared magnitude.
    pub bailout: f64,
}

impl Config {
    /// The reference channel layout for a `width` x `height` image:
    /// red and blue at 50 iterations, green at 500, each sampled
    /// `density` times per pixel.
    pub fn reference_channels(width: usize, height: usize, density: usize) -> [Channel; 3] {
        let samples = width * height * density;
        [
            Channel::new("Red", 50, samples),
            Channel::new("Green", 500, samples),
            Channel::new("Blue", 50, samples),
        ]
    }

    /// Checks every value, so that a bad configuration is refused
    /// before any sampling starts.
    pub fn validate(&self) -> Result<(), BuddhabrotError> {
        // Re-run the corner checks; the fields are public.
        Viewport::new(self.viewport.min(), self.viewport.max())?;

        if self.width == 0 || self.height == 0 {
            return Err(BuddhabrotError::config(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        if self.threads == 0 {
            return Err(BuddhabrotError::config("at least one thread is required"));
        }

        if self.max_color == 0 {
            return Err(BuddhabrotError::config("the maximum color value must be positive"));
        }

        if !(self.bailout.is_finite() && self.bailout > 0.0) {
            return Err(BuddhabrotError::config(format!(
                "the bailout must be a positive number, got {}",
                self.bailout
            )));
        }

        for channel in self.channels.iter() {
            let visits = (channel.samples as u64).checked_mul(channel.iterations as u64);
            if visits.is_none() {
                return Err(BuddhabrotError::CounterOverflow {
                    channel: channel.label.clone(),
                    samples: channel.samples,
                    iterations: channel.iterations,
                });
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            viewport: Viewport::default(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            channels: Config::reference_channels(DEFAULT_SIZE, DEFAULT_SIZE, DEFAULT_DENSITY),
            max_color: 255,
            threads: 1,
            seed: Seed::Clock,
            bailout: ESCAPE_THRESHOLD,
        }
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let config = Config::default();
        assert_eq!(config.viewport.min(), Complex::new(-2.0, -1.5));
        assert_eq!(config.viewport.max(), Complex::new(1.0, 1.5));
        assert_eq!((config.width, config.height), (400, 400));
        let budgets: Vec<usize> = config.channels.iter().map(|c| c.iterations).collect();
        assert_eq!(budgets, vec![50, 500, 50]);
        assert!(config.channels.iter().all(|c| c.samples == 400 * 400 * 100));
        assert_eq!(config.max_color, 255);
        assert_eq!(config.bailout, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_refused() {
        let mut config = Config::default();
        config.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_threads_are_refused() {
        let mut config = Config::default();
        config.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_color_depth_is_refused() {
        let mut config = Config::default();
        config.max_color = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nonsense_bailouts_are_refused() {
        let mut config = Config::default();
        config.bailout = -1.0;
        assert!(config.validate().is_err());
        config.bailout = std::f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn overflowing_channels_are_refused() {
        let mut config = Config::default();
        config.channels[1] = Channel::new("Green", usize::max_value(), 3);
        match config.validate() {
            Err(BuddhabrotError::CounterOverflow { channel, .. }) => assert_eq!(channel, "Green"),
            other => panic!("expected an overflow error, got {:?}", other),
        }
    }

    #[test]
    fn fixed_seeds_resolve_to_themselves() {
        assert_eq!(Seed::Fixed(17).resolve(), 17);
    }

    #[test]
    fn stream_seeds_differ_per_stream() {
        assert_ne!(stream_seed(1, 0), stream_seed(1, 1));
        assert_eq!(stream_seed(1, 2), stream_seed(1, 2));
    }

    #[test]
    fn parses_pairs() {
        assert_eq!(parse_pair::<usize>("400x300", 'x'), Some((400, 300)));
        assert_eq!(parse_pair::<usize>("400x", 'x'), None);
        assert_eq!(parse_pair::<usize>("400", 'x'), None);
        assert_eq!(parse_complex("-2.0,-1.5"), Some(Complex::new(-2.0, -1.5)));
        assert_eq!(parse_complex("-2.0;-1.5"), None);
    }
}
