// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate nebulabrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{err_msg, format_err, Error};
use log::info;
use nebulabrot::config::{parse_complex, parse_pair};
use nebulabrot::progress::format_elapsed;
use nebulabrot::{render, save_or_discard, BuddhabrotError, Channel, Config, LogProgress, Seed, Viewport};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive_float(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const RED: &str = "red";
const GREEN: &str = "green";
const BLUE: &str = "blue";
const DENSITY: &str = "density";
const THREADS: &str = "threads";
const SEED: &str = "seed";
const MAX_COLOR: &str = "max-color";
const BAILOUT: &str = "bailout";

fn iterations_arg<'a, 'b>(name: &'a str, default: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .required(false)
        .long(name)
        .takes_value(true)
        .default_value(default)
        .validator(|s| {
            validate_range(
                &s,
                1,
                10_000_000,
                "Could not parse iteration count",
                "Iteration count must be between 1 and 10000000",
            )
        })
}

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("buddha")
        .version("0.1.0")
        .about("Nebulabrot renderer: three Buddhabrots as the red, green and blue channels")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("out.ppm")
                .help("Output file (plain-text PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("400x400")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the sampled region, RE,IM"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the sampled region, RE,IM"),
        )
        .arg(iterations_arg(RED, "50").help("Iteration budget of the red channel"))
        .arg(iterations_arg(GREEN, "500").help("Iteration budget of the green channel"))
        .arg(iterations_arg(BLUE, "50").help("Iteration budget of the blue channel"))
        .arg(
            Arg::with_name(DENSITY)
                .required(false)
                .long(DENSITY)
                .short("d")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse sample density",
                        "Sample density must be between 1 and 1000000",
                    )
                })
                .help("Samples per pixel, per channel"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u64::max_value(),
                        "Could not parse seed",
                        "Seed out of range",
                    )
                })
                .help("Fixed random seed; defaults to the clock"),
        )
        .arg(
            Arg::with_name(MAX_COLOR)
                .required(false)
                .long(MAX_COLOR)
                .takes_value(true)
                .default_value("255")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        255,
                        "Could not parse maximum color value",
                        "Maximum color value must be between 1 and 255",
                    )
                })
                .help("Brightest color sample written"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .required(false)
                .long(BAILOUT)
                .takes_value(true)
                .default_value("2.0")
                .validator(|s| validate_positive_float(&s, "Bailout must be a positive number"))
                .help("Escape threshold on |z|^2; 4.0 is the textbook value"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing --{}", name))
}

fn number<T>(matches: &ArgMatches<'_>, name: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(T::from_str(value(matches, name)?)?)
}

fn config_from(matches: &ArgMatches<'_>) -> Result<Config, Error> {
    let (width, height) = parse_pair::<usize>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| err_msg("Error parsing image dimensions"))?;
    let leftlower = parse_complex(value(matches, LEFTLOWER)?)
        .ok_or_else(|| err_msg("Error parsing left lower point"))?;
    let rightupper = parse_complex(value(matches, RIGHTUPPER)?)
        .ok_or_else(|| err_msg("Error parsing right upper point"))?;

    let density: usize = number(matches, DENSITY)?;
    let samples = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(density))
        .ok_or_else(|| err_msg("Sample count is too large"))?;

    let seed = match matches.value_of(SEED) {
        Some(seed) => Seed::Fixed(u64::from_str(seed)?),
        None => Seed::Clock,
    };

    let config = Config {
        viewport: Viewport::new(leftlower, rightupper)?,
        width,
        height,
        channels: [
            Channel::new("Red", number(matches, RED)?, samples),
            Channel::new("Green", number(matches, GREEN)?, samples),
            Channel::new("Blue", number(matches, BLUE)?, samples),
        ],
        max_color: number(matches, MAX_COLOR)?,
        threads: number(matches, THREADS)?,
        seed,
        bailout: number(matches, BAILOUT)?,
    };
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = config_from(matches)?;

    // Open the output before spending hours on the render.
    let path = Path::new(value(matches, OUTPUT)?);
    let output =
        File::create(path).map_err(|cause| BuddhabrotError::io(path.display().to_string(), cause))?;

    let start = Instant::now();
    save_or_discard(output, path, render(&config, &LogProgress))?;

    info!("Time elapsed: {}", format_elapsed(start.elapsed()));
    info!("Wrote {}x{} image to {}", config.width, config.height, path.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
