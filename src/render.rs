// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The whole pipeline: three channels sampled one after the other,
//! normalized against their shared maximum, and written out as a
//! plain-text PPM.

use image::pnm::PNMEncoder;
use image::pnm::{PNMHeader, PixmapHeader, SampleEncoding};
use image::ColorType;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::color::{colorize, RgbRaster};
use crate::config::{stream_seed, Channel, Config};
use crate::errors::BuddhabrotError;
use crate::generator::HeatmapGenerator;
use crate::heatmap::{Count, GlobalMax, Heatmap};
use crate::planes::PlaneMapper;
use crate::progress::ProgressSink;

/// The three raw heatmaps of a render and the largest count among
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Channels {
    /// Heatmap of the first channel.
    pub red: Heatmap,
    /// Heatmap of the second channel.
    pub green: Heatmap,
    /// Heatmap of the third channel.
    pub blue: Heatmap,
    /// The brightest pixel over all three.
    pub global_max: Count,
}

/// Validates `config` and samples all three channels.
pub fn sample_channels(
    config: &Config,
    progress: &dyn ProgressSink,
) -> Result<Channels, BuddhabrotError> {
    config.validate()?;

    let seed = config.seed.resolve();
    info!("sampling with seed {}", seed);

    let plane = PlaneMapper::new(config.width, config.height, config.viewport);
    let generator = HeatmapGenerator::new(&plane, config.threads).with_bailout(config.bailout);
    let global_max = GlobalMax::new();

    let sample = |index: u64, channel: &Channel| -> Result<Heatmap, BuddhabrotError> {
        info!(
            "{} channel: {} samples, {} iterations",
            channel.label, channel.samples, channel.iterations
        );
        let heatmap = generator.generate(channel, stream_seed(seed, index), &global_max, progress)?;
        info!("{} channel done", channel.label);
        Ok(heatmap)
    };

    let [red, green, blue] = &config.channels;
    let red = sample(0, red)?;
    let green = sample(1, green)?;
    let blue = sample(2, blue)?;

    let global_max = global_max.get();
    if global_max == 0 {
        warn!("no escaping orbit crossed the viewport; the image will be black");
    } else {
        info!("brightest pixel visited {} times", global_max);
    }

    Ok(Channels {
        red,
        green,
        blue,
        global_max,
    })
}

/// Samples, normalizes and colorizes.
pub fn render(config: &Config, progress: &dyn ProgressSink) -> Result<RgbRaster, BuddhabrotError> {
    let channels = sample_channels(config, progress)?;
    colorize(
        &channels.red,
        &channels.green,
        &channels.blue,
        channels.global_max,
        config.max_color,
    )
}

/// Encodes `raster` as an ASCII ("P3") pixmap whose header declares
/// the raster's own maximum color value.
pub fn write_ppm<W: Write>(writer: W, raster: &RgbRaster) -> io::Result<()> {
    let header = PixmapHeader {
        encoding: SampleEncoding::Ascii,
        width: raster.width as u32,
        height: raster.height as u32,
        maxval: u32::from(raster.max_color),
    };
    let mut encoder = PNMEncoder::new(writer).with_header(PNMHeader::from(header));
    encoder.encode(
        &raster.pixels[..],
        raster.width as u32,
        raster.height as u32,
        ColorType::RGB(8),
    )
}

/// Writes `raster` into `output`, an already opened file at `path`.
pub fn save(output: File, path: &Path, raster: &RgbRaster) -> Result<(), BuddhabrotError> {
    let fail = |cause: io::Error| BuddhabrotError::io(path.display().to_string(), cause);
    let mut output = BufWriter::new(output);
    write_ppm(&mut output, raster).map_err(fail)?;
    output.flush().map_err(fail)
}

/// Saves a finished render into `output`, or, if the render or the
/// write failed, deletes the file at `path` so no empty or truncated
/// image is left behind.
pub fn save_or_discard(
    output: File,
    path: &Path,
    rendered: Result<RgbRaster, BuddhabrotError>,
) -> Result<(), BuddhabrotError> {
    // The file is closed before it is removed.
    let saved = rendered.and_then(|raster| save(output, path, &raster));
    if saved.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!("could not remove {}: {}", path.display(), e);
        }
    }
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Seed;
    use crate::planes::Viewport;
    use crate::progress::NullProgress;
    use tempfile::tempdir;

    fn tiny(seed: u64, threads: usize) -> Config {
        Config {
            viewport: Viewport::default(),
            width: 10,
            height: 10,
            channels: [
                Channel::new("Red", 5, 1000),
                Channel::new("Green", 5, 1000),
                Channel::new("Blue", 5, 1000),
            ],
            max_color: 255,
            threads,
            seed: Seed::Fixed(seed),
            bailout: 2.0,
        }
    }

    #[test]
    fn fixed_seed_renders_are_reproducible() {
        let first = sample_channels(&tiny(42, 1), &NullProgress).unwrap();
        let second = sample_channels(&tiny(42, 1), &NullProgress).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn threaded_renders_are_reproducible() {
        let first = sample_channels(&tiny(42, 3), &NullProgress).unwrap();
        let second = sample_channels(&tiny(42, 3), &NullProgress).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn channels_get_their_own_streams() {
        let channels = sample_channels(&tiny(42, 1), &NullProgress).unwrap();
        assert_ne!(channels.red, channels.blue);
    }

    #[test]
    fn global_max_is_the_brightest_channel_pixel() {
        let channels = sample_channels(&tiny(5, 2), &NullProgress).unwrap();
        let brightest = channels
            .red
            .max()
            .max(channels.green.max())
            .max(channels.blue.max());
        assert_eq!(channels.global_max, brightest);
        assert!(brightest > 0);
    }

    #[test]
    fn render_reaches_full_brightness_somewhere() {
        let raster = render(&tiny(8, 1), &NullProgress).unwrap();
        assert_eq!(raster.pixels.len(), 10 * 10 * 3);
        assert_eq!(raster.pixels.iter().max(), Some(&255));
    }

    #[test]
    fn bad_configs_fail_before_sampling() {
        struct Unreachable;
        impl ProgressSink for Unreachable {
            fn report(&self, _: &str, _: usize, _: usize) {
                panic!("sampling should never start");
            }
        }
        let mut config = tiny(1, 1);
        config.threads = 0;
        assert!(render(&config, &Unreachable).is_err());
    }

    fn header_tokens(raster: &RgbRaster) -> Vec<String> {
        let mut out = vec![];
        write_ppm(&mut out, raster).unwrap();
        String::from_utf8(out)
            .unwrap()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn ppm_has_header_and_one_triple_per_pixel() {
        let raster = RgbRaster {
            width: 3,
            height: 2,
            pixels: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            max_color: 255,
        };
        let tokens = header_tokens(&raster);
        assert_eq!(&tokens[..4], &["P3", "3", "2", "255"]);
        let samples: Vec<u8> = tokens[4..].iter().map(|t| t.parse().unwrap()).collect();
        assert_eq!(samples, raster.pixels);
    }

    #[test]
    fn ppm_header_declares_the_configured_color_depth() {
        let mut config = tiny(1, 1);
        config.max_color = 100;
        let raster = render(&config, &NullProgress).unwrap();
        assert_eq!(raster.pixels.iter().max(), Some(&100));

        let tokens = header_tokens(&raster);
        assert_eq!(&tokens[..4], &["P3", "10", "10", "100"]);
        assert!(tokens[4..].iter().all(|t| t.parse::<u8>().unwrap() <= 100));
    }

    fn black_pixel() -> RgbRaster {
        RgbRaster {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0],
            max_color: 255,
        }
    }

    #[test]
    fn save_writes_into_the_opened_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let output = File::create(&path).unwrap();
        save(output, &path, &black_pixel()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("P3"));
    }

    #[test]
    fn save_reports_the_path_it_could_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("read-only.ppm");
        File::create(&path).unwrap();
        let output = File::open(&path).unwrap();
        match save(output, &path, &black_pixel()) {
            Err(BuddhabrotError::Io { path, .. }) => assert!(path.contains("read-only.ppm")),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn failed_renders_leave_no_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let output = File::create(&path).unwrap();
        let failed = Err(BuddhabrotError::WorkerPanicked {
            channel: "Red".to_string(),
        });
        assert!(save_or_discard(output, &path, failed).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn successful_renders_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let output = File::create(&path).unwrap();
        save_or_discard(output, &path, Ok(black_pixel())).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("P3"));
    }
}
