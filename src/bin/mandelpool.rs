// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use failure::format_err;
use image::ColorType;
use log::{info, warn};
use num::Complex;

use mandelpool::{EdgePolicy, FrameView, Jitter, RenderConfig, Renderer};

fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let left = T::from_str(&s[..index]).ok()?;
    let right = T::from_str(&s[index + 1..]).ok()?;
    Some((left, right))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    unparsable: &str,
    out_of_range: &str,
) -> Result<(), String> {
    let value = T::from_str(s).map_err(|_| unparsable.to_string())?;
    if value < low || value > high {
        return Err(out_of_range.to_string());
    }
    Ok(())
}

fn validate_extent(s: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        Ok(_) => Err("Extent must be a positive number".to_string()),
        Err(_) => Err("Could not parse extent".to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ORIGIN: &str = "origin";
const EXTENT: &str = "extent";
const ITERATIONS: &str = "iterations";
const SAMPLES: &str = "samples";
const BLOCKS: &str = "blocks";
const THREADS: &str = "threads";
const EDGES: &str = "edges";
const SEED: &str = "seed";
const QUEUE: &str = "queue";
const QUIET: &str = "quiet";

const MAX_THREADS: usize = 1024;
const MAX_BLOCKS: usize = std::u32::MAX as usize;

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelpool")
        .version("0.1.0")
        .about("Block-parallel supersampling Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Image file to write when the render finishes (format from extension)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1023x1023")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(ORIGIN)
                .required(false)
                .long(ORIGIN)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-1.2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse origin"))
                .help("Point of the complex plane at the top left corner"),
        )
        .arg(
            Arg::with_name(EXTENT)
                .required(false)
                .long(EXTENT)
                .short("e")
                .takes_value(true)
                .default_value("2.5")
                .validator(|s| validate_extent(&s))
                .help("Height of the window on the complex plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration limit per sample"),
        )
        .arg(
            Arg::with_name(SAMPLES)
                .required(false)
                .long(SAMPLES)
                .short("n")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse sample count",
                        "Sample count must be between 1 and 100000",
                    )
                })
                .help("Jittered samples averaged into each pixel"),
        )
        .arg(
            Arg::with_name(BLOCKS)
                .required(false)
                .long(BLOCKS)
                .short("b")
                .takes_value(true)
                .default_value("128")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        MAX_BLOCKS,
                        "Could not parse block count",
                        &format!("Block count must be between 1 and {}", MAX_BLOCKS),
                    )
                })
                .help("Number of work blocks, rounded down to a square"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("16")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        MAX_THREADS,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", MAX_THREADS),
                    )
                })
                .help("Number of blocks computed at once"),
        )
        .arg(
            Arg::with_name(EDGES)
                .required(false)
                .long(EDGES)
                .takes_value(true)
                .possible_values(&["extend", "truncate"])
                .default_value("extend")
                .help("Whether the last blocks stretch to the image edge or leave a border"),
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
                        std::u64::MAX,
                        "Could not parse seed",
                        "Seed out of range",
                    )
                })
                .help("Seed for reproducible jitter"),
        )
        .arg(
            Arg::with_name(QUEUE)
                .required(false)
                .long(QUEUE)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        std::usize::MAX,
                        "Could not parse queue capacity",
                        "Queue capacity must be positive",
                    )
                })
                .help("Bound the pixel stream to this many pixels"),
        )
        .arg(
            Arg::with_name(QUIET)
                .long(QUIET)
                .short("q")
                .help("Do not print progress"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} {}", name, raw))
}

fn config(matches: &ArgMatches) -> Result<RenderConfig, failure::Error> {
    let size = matches.value_of(SIZE).unwrap_or_default();
    let (width, height) = parse_pair::<usize>(size, 'x')
        .ok_or_else(|| format_err!("could not parse --size {}", size))?;
    let origin = matches.value_of(ORIGIN).unwrap_or_default();
    let origin =
        parse_complex(origin).ok_or_else(|| format_err!("could not parse --origin {}", origin))?;

    let jitter = match matches.value_of(SEED) {
        Some(_) => Jitter::Seeded(value(matches, SEED)?),
        None => Jitter::Random,
    };
    let edges = match matches.value_of(EDGES) {
        Some("truncate") => EdgePolicy::Truncate,
        _ => EdgePolicy::Extend,
    };
    let pixel_queue = match matches.value_of(QUEUE) {
        Some(_) => Some(value(matches, QUEUE)?),
        None => None,
    };

    Ok(RenderConfig {
        width,
        height,
        origin,
        extent: value(matches, EXTENT)?,
        max_iterations: value(matches, ITERATIONS)?,
        samples: value(matches, SAMPLES)?,
        blocks: value(matches, BLOCKS)?,
        workers: value(matches, THREADS)?,
        edges,
        jitter,
        pixel_queue,
        ..RenderConfig::default()
    })
}

fn write_image(outfile: &str, frame: &FrameView) -> Result<(), std::io::Error> {
    image::save_buffer(
        Path::new(outfile),
        &frame.to_rgba(),
        frame.width() as u32,
        frame.height() as u32,
        ColorType::RGBA(8),
    )
}

fn run(renderer: &Renderer, output: Option<&str>, quiet: bool) -> Result<(), failure::Error> {
    let handle = renderer.start();
    handle.poll(Duration::from_millis(100), |progress| {
        if !quiet {
            eprint!(
                "\r{}/{} ({}%)",
                progress.completed(),
                progress.total(),
                progress.percent()
            );
        }
    });
    if !quiet {
        eprintln!();
    }

    let frame = handle.frame().clone();
    let report = handle.join()?;
    if report.uncovered_pixels > 0 {
        warn!("{} border pixels were left unrendered", report.uncovered_pixels);
    }
    println!(
        "Finished {} pixels in {:.2?}",
        report.pixels_written, report.elapsed
    );

    if let Some(outfile) = output {
        write_image(outfile, &frame)?;
        info!("wrote {}", outfile);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let matches = args();

    let renderer = match config(&matches) {
        Ok(config) => {
            if config.workers > num_cpus::get() {
                warn!(
                    "{} workers requested on {} cpus",
                    config.workers,
                    num_cpus::get()
                );
            }
            Renderer::new(config).map_err(failure::Error::from)
        }
        Err(e) => Err(e),
    };
    let renderer = match renderer {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&renderer, matches.value_of(OUTPUT), matches.is_present(QUIET)) {
        eprintln!("Render failure: {}", e);
        process::exit(1);
    }
}
