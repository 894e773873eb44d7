//! shoreline: compute a land/water raster and vector shoreline from
//! multispectral bands.
//!
//! Reads the input bands, computes a water index, classifies it into
//! land, marginal and water levels, and writes the classified raster as
//! a TIFF. Unless edge detection is requested, the raster is then traced
//! into GeoJSON polygons.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin shoreline -- [OPTIONS] <BANDS>... [--output <PATH>]
//! ```
//!
//! With `--output coast.json` the raster goes to `coast.tif` and the
//! polygons to `coast.json`. Without `--output`, the polygons are printed
//! and the raster is written to `temp_shoreline_<timestamp>.tif`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use shoreline_io::{Configured, VectorStatus, VectorizerRegistry};
use shoreline_pipeline::{
    AffineGeometry, Algorithm, ColorCoding, DEFAULT_TILE_SIZE, PixelSource, ShorelineConfig,
    Threshold,
};

/// Shoreline detection from multispectral imagery.
///
/// Band order follows the algorithm: NDWI takes green then NIR; AWEI
/// takes green, NIR, SWIR1 and SWIR2. Extra bands are ignored.
#[derive(Parser)]
#[command(name = "shoreline", version)]
struct Cli {
    /// Input band files in algorithm order.
    #[arg(required = true)]
    bands: Vec<PathBuf>,

    /// Vector product path (raster product goes next to it as .tif). In
    /// edge mode, the raster product path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Water index algorithm (ndwi or awei).
    #[arg(long, default_value_t = Algorithm::default())]
    algorithm: Algorithm,

    /// Output levels for water, marginal and land pixels.
    #[arg(long, num_args = 3, value_names = ["WATER", "MARGINAL", "LAND"])]
    color_coding: Option<Vec<u8>>,

    /// Produce an edge map instead of a classified raster; no vectors.
    #[arg(long)]
    edge: bool,

    /// Sensor the bands come from.
    #[arg(long, default_value = ShorelineConfig::DEFAULT_SENSOR)]
    sensor: String,

    /// Gaussian smoothing sigma in pixels (0 disables smoothing).
    #[arg(long, default_value_t = ShorelineConfig::DEFAULT_SMOOTHING)]
    smooth: f32,

    /// Water threshold in [0, 1], or "X" to output the raw index.
    #[arg(long, default_value_t = Threshold::Level(ShorelineConfig::DEFAULT_THRESHOLD))]
    threshold: Threshold,

    /// Half-width of the marginal band around the threshold.
    #[arg(long, default_value_t = ShorelineConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Tile edge length for the production pass.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    tile_size: u32,

    /// Affine geotransform "X0 DX RX Y0 RY DY" (GDAL order). Defaults to
    /// pixel coordinates.
    #[arg(long, num_args = 6, allow_negative_numbers = true)]
    geotransform: Option<Vec<f64>>,

    /// Vectorizer to use for the polygon product.
    #[arg(long, default_value = shoreline_io::CONTOUR_VECTORIZER)]
    vectorizer: String,

    /// Ring simplification tolerance in pixels (0 keeps every vertex).
    #[arg(long, default_value_t = 0.0)]
    simplify: f64,

    /// Full shoreline config as a JSON string.
    ///
    /// When provided, all other classification flags are ignored.
    /// The JSON must be a valid `ShorelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Build a [`ShorelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual classification flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ShorelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let color_coding = match cli.color_coding.as_deref() {
        None => ColorCoding::default(),
        Some(&[water, marginal, land]) => ColorCoding {
            water,
            marginal,
            land,
        },
        Some(other) => return Err(format!("--color-coding takes 3 values, got {}", other.len())),
    };

    Ok(ShorelineConfig {
        algorithm: cli.algorithm,
        sensor: cli.sensor.clone(),
        threshold: cli.threshold,
        tolerance: cli.tolerance,
        smoothing: cli.smooth,
        do_edge_detect: cli.edge,
        color_coding,
    })
}

fn geometry_from_cli(cli: &Cli, source: &dyn PixelSource) -> Result<AffineGeometry, String> {
    let size = source.dimensions();
    match cli.geotransform.as_deref() {
        None => Ok(AffineGeometry::identity(size)),
        Some(&[c0, c1, c2, c3, c4, c5]) => Ok(AffineGeometry::new([c0, c1, c2, c3, c4, c5], size)),
        Some(other) => Err(format!("--geotransform takes 6 values, got {}", other.len())),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            error!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "{} on {} bands, threshold {}, tolerance {}, smoothing {}, edge {}",
        config.algorithm,
        cli.bands.len(),
        config.threshold,
        config.tolerance,
        config.smoothing,
        config.do_edge_detect
    );

    let source: Arc<dyn PixelSource> = match shoreline_io::load_bands(&cli.bands) {
        Ok(stack) => Arc::new(stack),
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let geometry = match geometry_from_cli(&cli, source.as_ref()) {
        Ok(g) => g,
        Err(msg) => {
            error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let produced = match Configured::new(
        &config,
        source,
        geometry,
        cli.output.as_deref(),
        &timestamp,
    )
    .map(|c| {
        c.with_tile_size(cli.tile_size)
            .with_simplify_tolerance(cli.simplify)
    })
    .and_then(Configured::produce_raster)
    {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = VectorizerRegistry::default();
    let vectorizer = registry.create(&cli.vectorizer);
    let report = produced.finish(vectorizer.as_deref(), &mut std::io::stdout());

    match &report.vector {
        VectorStatus::Skipped => info!("edge map written to <{}>", report.raster.display()),
        VectorStatus::Written { polygons, .. } => info!("{polygons} shoreline polygons written"),
        VectorStatus::Unavailable | VectorStatus::Failed(_) => {}
    }
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
