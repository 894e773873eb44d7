//! Product orchestration: raster first, then (optionally) vectors.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use shoreline_io::{Configured, ProductError, VectorizerRegistry, load_bands};
//! # use shoreline_pipeline::{AffineGeometry, PixelSource, ShorelineConfig};
//! # fn run() -> Result<(), ProductError> {
//! let source: Arc<dyn PixelSource> = Arc::new(load_bands(&["green.tif", "nir.tif"])?);
//! let geometry = AffineGeometry::identity(source.dimensions());
//! let registry = VectorizerRegistry::default();
//! let vectorizer = registry.create("contour");
//!
//! let report = Configured::new(&ShorelineConfig::default(), source, geometry, None, "now")?
//!     .produce_raster()?
//!     .finish(vectorizer.as_deref(), &mut std::io::stdout());
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state. A
//! failure while producing the raster is fatal. Once the raster exists
//! it is kept no matter how vectorization turns out; [`ProductReport`]
//! records what happened to the vector stage.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use shoreline_pipeline::{
    AffineGeometry, Aoi, ChipEvaluator, DEFAULT_TILE_SIZE, IndexImage, PixelSource,
    ProcessingChain, SampleFormat, ShorelineConfig, TileGrid,
};

use crate::error::{ProductError, VectorizeError};
use crate::output::{ProductPaths, VectorTarget};
use crate::raster::write_product;
use crate::vectorize::{VectorMode, VectorizeRequest, Vectorizer};

// ───────────────────────── Stage 0: Configured ──────────────────────────

/// Orchestrator state after the chain has been assembled.
///
/// Call [`produce_raster`](Self::produce_raster) to continue.
#[must_use = "orchestrator stages are consumed by advancing; call .produce_raster() to continue"]
pub struct Configured {
    chain: ProcessingChain,
    geometry: AffineGeometry,
    paths: ProductPaths,
    water: u8,
    tile_size: u32,
    simplify_tolerance: f64,
}

impl std::fmt::Debug for Configured {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configured")
            .field("chain", &self.chain)
            .field("paths", &self.paths)
            .field("tile_size", &self.tile_size)
            .finish_non_exhaustive()
    }
}

impl Configured {
    /// Assemble the chain for `config` over `source` and resolve product
    /// locations from `output`.
    ///
    /// The geometry is resized to the source dimensions. `timestamp`
    /// names the temporary raster when `output` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::Pipeline`] for any configuration or
    /// geometry error.
    pub fn new(
        config: &ShorelineConfig,
        source: Arc<dyn PixelSource>,
        mut geometry: AffineGeometry,
        output: Option<&Path>,
        timestamp: &str,
    ) -> Result<Self, ProductError> {
        let dims = source.dimensions();
        geometry.set_image_size(dims);
        let aoi = Aoi::from_pixel(dims.full_rect(), &geometry);
        let chain = ProcessingChain::assemble(config, source, &aoi)?;
        let paths = ProductPaths::resolve(output, config.do_edge_detect, timestamp);
        debug!("product paths: {paths:?}");
        Ok(Self {
            chain,
            geometry,
            paths,
            water: config.color_coding.water,
            tile_size: DEFAULT_TILE_SIZE,
            simplify_tolerance: 0.0,
        })
    }

    /// Set the tile edge length used for the production pass.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the ring simplification tolerance handed to the vectorizer.
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }

    /// The assembled chain.
    #[must_use]
    pub const fn chain(&self) -> &ProcessingChain {
        &self.chain
    }

    /// Resolved product locations.
    #[must_use]
    pub const fn paths(&self) -> &ProductPaths {
        &self.paths
    }

    /// Evaluate the chain tile by tile over the whole raster and write
    /// the product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError`] if any chip fails or the raster cannot
    /// be written.
    pub fn produce_raster(self) -> Result<RasterProduced, ProductError> {
        let dims = self.chain.source().dimensions();
        let grid = TileGrid::new(dims, self.tile_size);
        let evaluator = ChipEvaluator::new(&self.chain, Some(&self.geometry));
        let mut product = IndexImage::new(dims.width, dims.height);
        for rect in grid.iter() {
            let chip = evaluator.get_chip(rect)?.ok_or(ProductError::NoGeometry)?;
            image::imageops::replace(
                &mut product,
                &chip.tile,
                i64::from(rect.x),
                i64::from(rect.y),
            );
        }

        let sample_format = self.chain.sample_format();
        write_product(
            &self.paths.raster,
            &product,
            sample_format,
            Some(&self.geometry),
        )?;
        Ok(RasterProduced {
            sample_format,
            geometry: self.geometry,
            paths: self.paths,
            water: self.water,
            simplify_tolerance: self.simplify_tolerance,
        })
    }
}

// ───────────────────────── Stage 1: RasterProduced ──────────────────────────

/// Orchestrator state after the raster product is on disk.
///
/// Call [`finish`](Self::finish) to run the vector stage and get the
/// report.
#[derive(Debug)]
#[must_use = "orchestrator stages are consumed by advancing; call .finish() to continue"]
pub struct RasterProduced {
    sample_format: SampleFormat,
    geometry: AffineGeometry,
    paths: ProductPaths,
    water: u8,
    simplify_tolerance: f64,
}

impl RasterProduced {
    /// Path of the written raster product.
    #[must_use]
    pub fn raster_path(&self) -> &Path {
        &self.paths.raster
    }

    /// Run the vector stage, if any, and report the outcome.
    ///
    /// In edge mode the vectorizer is never consulted. Otherwise a
    /// missing vectorizer is reported as [`VectorStatus::Unavailable`]
    /// and a failing one as [`VectorStatus::Failed`]; the raster product
    /// stays on disk either way. An unclassified raster (threshold
    /// skipped) has no water level, so it fails without calling the
    /// vectorizer.
    pub fn finish(self, vectorizer: Option<&dyn Vectorizer>, console: &mut dyn Write) -> ProductReport {
        let vector = match (&self.paths.vector, vectorizer) {
            (None, _) => VectorStatus::Skipped,
            (Some(_), None) => {
                warn!(
                    "no vectorizer available to perform vectorization; only the classified \
                     raster is available at <{}>",
                    self.paths.raster.display()
                );
                VectorStatus::Unavailable
            }
            (Some(_), Some(_)) if self.sample_format == SampleFormat::F32 => {
                let e = VectorizeError::Unclassified {
                    raster: self.paths.raster.clone(),
                };
                warn!("{e}");
                VectorStatus::Failed(e)
            }
            (Some(target), Some(vectorizer)) => {
                let request = VectorizeRequest {
                    raster: &self.paths.raster,
                    output: target,
                    mode: VectorMode::Polygon,
                    foreground: self.water,
                    geometry: Some(&self.geometry),
                    simplify_tolerance: self.simplify_tolerance,
                };
                info!("vectorizing with <{}>", vectorizer.name());
                match vectorizer.vectorize(&request, console) {
                    Ok(summary) => VectorStatus::Written {
                        target: target.clone(),
                        polygons: summary.polygons,
                    },
                    Err(e) => {
                        error!("vectorization failed: {e}");
                        VectorStatus::Failed(e)
                    }
                }
            }
        };
        ProductReport {
            raster: self.paths.raster,
            vector,
        }
    }
}

// ───────────────────────── Stage 2: Done ──────────────────────────

/// What happened to the vector stage.
#[derive(Debug)]
pub enum VectorStatus {
    /// Edge mode: no vector product is made.
    Skipped,
    /// No vectorizer was available.
    Unavailable,
    /// The vector product was written.
    Written {
        /// Where it went.
        target: VectorTarget,
        /// Polygons written.
        polygons: usize,
    },
    /// The vectorizer ran and failed.
    Failed(VectorizeError),
}

/// Final outcome of a product run.
#[derive(Debug)]
pub struct ProductReport {
    /// Raster product path (always written).
    pub raster: PathBuf,
    /// Vector stage outcome.
    pub vector: VectorStatus,
}

impl ProductReport {
    /// Whether every requested product was made.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self.vector,
            VectorStatus::Skipped | VectorStatus::Written { .. }
        )
    }
}
