// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MeshLine Inspector - build geometry from JSON inputs and report buffer
//! statistics.
//!
//! Usage:
//!   meshline-inspect ribbon <points.json> [options]
//!   meshline-inspect text <font.json> <text> [options]

use anyhow::{bail, Context, Result};
use meshline_core::{BitmapFont, PointSource};
use meshline_geometry::{
    Align, Point3, Ray, Raycaster, RibbonBuilder, TextGeometry, TextUpdate, Vector3, WrapMode,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::sync::Arc;

mod config;
mod report;

use config::Config;
use report::{RibbonReport, TextReport};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,meshline=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let mut config = Config::from_env();
    tracing::debug!(?config, "Loaded configuration");

    match args[1].as_str() {
        "ribbon" => inspect_ribbon(&args[2], &args[3..], &mut config),
        "text" => {
            let Some(text) = args.get(3) else {
                print_usage();
                bail!("missing text argument");
            };
            inspect_text(&args[2], text, &args[4..], &mut config)
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other);
        }
    }
}

fn inspect_ribbon(path: &str, options: &[String], config: &mut Config) -> Result<()> {
    let mut advances: Vec<Point3<f32>> = Vec::new();
    let mut pick: Option<Ray> = None;

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--line-width" => {
                config.line_width = parse_value(options, &mut i)?;
            }
            "--advance" => {
                let [x, y, z] = parse_triple(&next_value(options, &mut i)?)?;
                advances.push(Point3::new(x, y, z));
            }
            "--pick" => {
                // origin:direction
                let value = next_value(options, &mut i)?;
                let (origin, direction) = value
                    .split_once(':')
                    .context("--pick expects x,y,z:dx,dy,dz")?;
                let [ox, oy, oz] = parse_triple(origin)?;
                let [dx, dy, dz] = parse_triple(direction)?;
                pick = Some(Ray::new(Point3::new(ox, oy, oz), Vector3::new(dx, dy, dz)));
            }
            "--pretty" => config.pretty = true,
            other => {
                print_usage();
                bail!("unknown option: {}", other);
            }
        }
        i += 1;
    }

    let json = fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&json).with_context(|| format!("'{}' is not valid JSON", path))?;
    let source = PointSource::from_json(&value).context("invalid point data")?;

    let mut builder = RibbonBuilder::new();
    builder.set_points(source, None).context("cannot build ribbon")?;
    for point in advances {
        builder.advance(point)?;
    }

    let hit = pick.and_then(|ray| builder.raycast(&Raycaster::new(ray), config.line_width));
    tracing::info!(
        points = builder.points().len(),
        vertices = builder.mesh().vertex_count(),
        hit = hit.is_some(),
        "Built ribbon"
    );

    print_report(&RibbonReport::new(&builder, hit), config.pretty)
}

fn inspect_text(path: &str, text: &str, options: &[String], config: &mut Config) -> Result<()> {
    let mut update = TextUpdate::new().text(text);

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--width" => update = update.width(parse_value(options, &mut i)?),
            "--size" => update = update.size(parse_value(options, &mut i)?),
            "--letter-spacing" => update = update.letter_spacing(parse_value(options, &mut i)?),
            "--line-height" => update = update.line_height(parse_value(options, &mut i)?),
            "--tab-size" => config.tab_size = parse_value(options, &mut i)?,
            "--align" => {
                update = update.align(match next_value(options, &mut i)?.as_str() {
                    "left" => Align::Left,
                    "center" => Align::Center,
                    "right" => Align::Right,
                    other => bail!("unknown alignment: {}", other),
                })
            }
            "--mode" => {
                update = update.mode(match next_value(options, &mut i)?.as_str() {
                    "greedy" => WrapMode::Greedy,
                    "pre" => WrapMode::Pre,
                    "nowrap" => WrapMode::NoWrap,
                    other => bail!("unknown wrap mode: {}", other),
                })
            }
            "--no-flip-y" => config.flip_y = false,
            "--multipage" => update = update.multipage(true),
            "--pretty" => config.pretty = true,
            other => {
                print_usage();
                bail!("unknown option: {}", other);
            }
        }
        i += 1;
    }

    let bytes = fs::read(path).with_context(|| format!("cannot read '{}'", path))?;
    let font = BitmapFont::from_slice(&bytes).with_context(|| format!("invalid font '{}'", path))?;

    let update = update
        .font(Arc::new(font))
        .tab_size(config.tab_size)
        .flip_y(config.flip_y);
    let geometry = TextGeometry::new(update).context("cannot build text geometry")?;

    tracing::info!(
        glyphs = geometry.layout().glyphs.len(),
        quads = geometry.quad_count(),
        lines = geometry.layout().lines_total,
        "Built text geometry"
    );

    print_report(&TextReport::new(&geometry), config.pretty)
}

fn print_report<T: Serialize>(report: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    println!("{}", json);
    Ok(())
}

fn next_value(options: &[String], i: &mut usize) -> Result<String> {
    let flag = &options[*i];
    *i += 1;
    options
        .get(*i)
        .cloned()
        .with_context(|| format!("{} expects a value", flag))
}

fn parse_value<T>(options: &[String], i: &mut usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let flag = options[*i].clone();
    let value = next_value(options, i)?;
    value
        .parse()
        .with_context(|| format!("invalid value for {}: {}", flag, value))
}

fn parse_triple(value: &str) -> Result<[f32; 3]> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("expected x,y,z, got '{}'", value))?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => bail!("expected three components, got '{}'", value),
    }
}

fn print_usage() {
    eprintln!("MeshLine Inspector");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  meshline-inspect ribbon <points.json> [options]");
    eprintln!("  meshline-inspect text <font.json> <text> [options]");
    eprintln!();
    eprintln!("Ribbon options:");
    eprintln!("  --line-width <w>         Line width used for picking (default: 1)");
    eprintln!("  --advance <x,y,z>        Slide the window by one point (repeatable)");
    eprintln!("  --pick <x,y,z:dx,dy,dz>  Cast a ray and report the first hit");
    eprintln!();
    eprintln!("Text options:");
    eprintln!("  --width <px>             Wrap width in font pixels");
    eprintln!("  --mode <greedy|pre|nowrap>");
    eprintln!("  --align <left|center|right>");
    eprintln!("  --size <units>           Output size; scales quads by size / font size");
    eprintln!("  --letter-spacing <px>");
    eprintln!("  --line-height <px>");
    eprintln!("  --tab-size <n>           Tab stop spacing in spaces (default: 4)");
    eprintln!("  --no-flip-y              Keep atlas V pointing down");
    eprintln!("  --multipage              Emit the page attribute");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --pretty                 Pretty-print the JSON report");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MESHLINE_LINE_WIDTH, MESHLINE_TAB_SIZE, MESHLINE_FLIP_Y, MESHLINE_PRETTY, RUST_LOG");
}
