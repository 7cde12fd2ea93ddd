//! Pixel map and reading strategy benchmark.
//!
//! This tool:
//! 1. Builds a synthetic global regular source grid and value field
//! 2. Builds a target grid over a bounding box
//! 3. Times PixelMap construction and reports its statistics
//! 4. Times every reading strategy and counts the reads it issues
//! 5. Optionally times a curvilinear source located through a lookup table
//!
//! Run with: cargo run --release --bin pixel-map-bench -- --target-width 1024

use anyhow::{bail, Context, Result};
use clap::Parser;
use geo_common::CrsCode;
use grid_sampler::{
    CurvilinearCoords, CurvilinearGrid, DataReadingStrategy, ExtractionConfig, GridVariable,
    HorizontalGrid, InMemoryVariable, LookupTableCache, PixelMap, RectilinearGrid,
    ReferenceableAxis,
};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pixel-map-bench")]
#[command(about = "Benchmark pixel map construction and data reading strategies")]
struct Args {
    /// Source grid resolution in degrees
    #[arg(long, default_value = "0.1")]
    source_resolution: f64,

    /// Target grid width in pixels
    #[arg(long, default_value = "512")]
    target_width: usize,

    /// Target grid height in pixels
    #[arg(long, default_value = "512")]
    target_height: usize,

    /// Target bounding box: min_lon,min_lat,max_lon,max_lat
    #[arg(long, default_value = "-130,20,-60,55")]
    bbox: String,

    /// Iterations per measurement
    #[arg(long, default_value = "5")]
    iterations: usize,

    /// Only run this strategy (default: all)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<DataReadingStrategy>,

    /// Cells per side of a rotated curvilinear source over the bbox (0 to skip)
    #[arg(long, default_value = "200")]
    curvilinear_size: usize,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_strategy(s: &str) -> std::result::Result<DataReadingStrategy, String> {
    DataReadingStrategy::from_str(s).ok_or_else(|| format!("unknown strategy '{}'", s))
}

fn parse_bbox(s: &str) -> Result<[f64; 4]> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid bbox '{}'", s))?;
    match parts.as_slice() {
        [min_lon, min_lat, max_lon, max_lat] if min_lon < max_lon && min_lat < max_lat => {
            Ok([*min_lon, *min_lat, *max_lon, *max_lat])
        }
        _ => bail!("bbox must be min_lon,min_lat,max_lon,max_lat with min < max"),
    }
}

fn lon_lat_grid(
    lon_first: f64,
    lon_spacing: f64,
    width: usize,
    lat_first: f64,
    lat_spacing: f64,
    height: usize,
) -> Result<HorizontalGrid> {
    let grid = RectilinearGrid::new(
        ReferenceableAxis::regular("lon", lon_first, lon_spacing, width, true)?,
        ReferenceableAxis::regular("lat", lat_first, lat_spacing, height, false)?,
        CrsCode::Epsg4326,
    )?;
    Ok(grid.into())
}

/// Square curvilinear grid over the bounding box, rotated 30 degrees about
/// its centre.
fn rotated_source(bbox: [f64; 4], n: usize, cache: &LookupTableCache) -> Result<HorizontalGrid> {
    let [min_lon, min_lat, max_lon, max_lat] = bbox;
    let (centre_lon, centre_lat) = ((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0);
    let spacing = (max_lon - min_lon).min(max_lat - min_lat) / n as f64;
    let (sin, cos) = 30.0_f64.to_radians().sin_cos();
    let half = (n as f64 - 1.0) / 2.0;

    let mut lons = Vec::with_capacity(n * n);
    let mut lats = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let x = (i as f64 - half) * spacing;
            let y = (j as f64 - half) * spacing;
            lons.push(centre_lon + x * cos - y * sin);
            lats.push(centre_lat + x * sin + y * cos);
        }
    }
    let coords = CurvilinearCoords::new(n, n, lons, lats)?;
    Ok(CurvilinearGrid::new(coords, cache)?.into())
}

/// Temperature-like field, one row per rayon task.
fn synthetic_field(nx: usize, ny: usize) -> Vec<f64> {
    let mut values = vec![0.0; nx * ny];
    values.par_chunks_mut(nx).enumerate().for_each(|(j, row)| {
        let lat_factor = (j as f64 / ny as f64 * std::f64::consts::PI).sin();
        for (i, value) in row.iter_mut().enumerate() {
            let lon_factor = (i as f64 / nx as f64 * 4.0 * std::f64::consts::PI).cos();
            *value = 250.0 + 50.0 * lat_factor + 5.0 * lon_factor;
        }
    });
    values
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ExtractionConfig::from_env();
    let cache = LookupTableCache::from_config(&config).context("invalid configuration")?;

    if !(args.source_resolution.is_finite() && args.source_resolution > 0.0) {
        bail!("source resolution must be positive");
    }
    let [min_lon, min_lat, max_lon, max_lat] = parse_bbox(&args.bbox)?;
    let iterations = args.iterations.max(1);

    // Source: global grid with cell edges on whole multiples of the resolution
    let res = args.source_resolution;
    let source_nx = (360.0 / res).round() as usize;
    let source_ny = (180.0 / res).round() as usize;
    let source = lon_lat_grid(
        -180.0 + res / 2.0,
        res,
        source_nx,
        -90.0 + res / 2.0,
        res,
        source_ny,
    )?;

    // Target: cell centres over the bounding box, north-up
    let dx = (max_lon - min_lon) / args.target_width as f64;
    let dy = (max_lat - min_lat) / args.target_height as f64;
    let target = lon_lat_grid(
        min_lon + dx / 2.0,
        dx,
        args.target_width,
        max_lat - dy / 2.0,
        -dy,
        args.target_height,
    )?;

    println!("Pixel Map Benchmark");
    println!("===================\n");
    println!("Source grid: {} x {} ({}°)", source_nx, source_ny, res);
    println!(
        "Target grid: {} x {} over [{}, {}, {}, {}]\n",
        args.target_width, args.target_height, min_lon, min_lat, max_lon, max_lat
    );

    let start = Instant::now();
    let field = synthetic_field(source_nx, source_ny);
    let variable = InMemoryVariable::from_2d("temperature", source_ny, source_nx, field)?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        values = source_nx * source_ny,
        "Generated source field"
    );

    // PixelMap construction
    let start = Instant::now();
    let mut pixel_map = PixelMap::for_grid(&source, &target)?;
    for _ in 1..iterations {
        pixel_map = PixelMap::for_grid(&source, &target)?;
    }
    let build_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

    println!("PixelMap:");
    println!("{:-<60}", "");
    println!("{:<30} {:>20.2} ms", "Build time", build_ms);
    println!("{:<30} {:>20}", "Pairs", pixel_map.len());
    println!("{:<30} {:>20}", "Unique source cells", pixel_map.num_unique_ij_pairs());
    println!("{:<30} {:>20}", "Bounding box cells", pixel_map.bounding_box_size());
    println!("{:<30} {:>20}", "Scanline cells", pixel_map.sum_row_lengths());
    println!("{:<30} {:>17} KB", "Index memory", pixel_map.memory_bytes() / 1024);
    println!("{:-<60}\n", "");

    let strategies = match args.strategy {
        Some(strategy) => vec![strategy],
        None => vec![
            DataReadingStrategy::PixelByPixel,
            DataReadingStrategy::Scanline,
            DataReadingStrategy::BoundingBox,
        ],
    };

    let selected = DataReadingStrategy::select(variable.source_kind(), &config);
    println!("Strategies (configured for this source: {}):", selected);
    println!("{:-<60}", "");
    println!("{:<20} {:>14} {:>10} {:>12}", "Strategy", "Read time", "Reads", "Valid");
    println!("{:-<60}", "");

    let mut reference: Option<Vec<f32>> = None;
    for strategy in strategies {
        variable.reset_read_count();
        let start = Instant::now();
        let mut values = strategy.read(&pixel_map, &variable, None, None)?;
        for _ in 1..iterations {
            values = strategy.read(&pixel_map, &variable, None, None)?;
        }
        let read_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;
        let reads = variable.read_count() / iterations as u64;
        let valid = values.iter().filter(|v| !v.is_nan()).count();

        println!(
            "{:<20} {:>11.2} ms {:>10} {:>12}",
            strategy.as_str(),
            read_ms,
            reads,
            valid
        );

        match &reference {
            Some(expected) => {
                let identical = expected.len() == values.len()
                    && expected
                        .iter()
                        .zip(&values)
                        .all(|(a, b)| a.to_bits() == b.to_bits());
                if !identical {
                    bail!("{} produced different values from the first strategy", strategy);
                }
            }
            None => reference = Some(values),
        }
    }
    println!("{:-<60}\n", "");

    if args.curvilinear_size >= 3 {
        let n = args.curvilinear_size;
        let start = Instant::now();
        let curvilinear = rotated_source([min_lon, min_lat, max_lon, max_lat], n, &cache)?;
        let lut_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let mut curvilinear_map = PixelMap::for_grid(&curvilinear, &target)?;
        for _ in 1..iterations {
            curvilinear_map = PixelMap::for_grid(&curvilinear, &target)?;
        }
        let map_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        // Same coordinates again come straight from the cache
        rotated_source([min_lon, min_lat, max_lon, max_lat], n, &cache)?;
        let stats = cache.stats();

        println!("Curvilinear source ({} x {}, rotated 30°):", n, n);
        println!("{:-<60}", "");
        println!("{:<30} {:>20.2} ms", "Lookup table build", lut_ms);
        println!("{:<30} {:>20.2} ms", "PixelMap build", map_ms);
        println!("{:<30} {:>20}", "Pairs", curvilinear_map.len());
        println!("{:<30} {:>20}", "Cache hits / misses", format!("{} / {}", stats.hits, stats.misses));
        println!("{:-<60}", "");
    }

    Ok(())
}
