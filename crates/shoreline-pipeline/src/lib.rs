//! shoreline-pipeline: Pure raster pipeline for shoreline detection
//! (sans-IO).
//!
//! Turns co-registered multispectral bands into a land / marginal / water
//! raster through:
//! water index -> hysteresis classification -> optional smoothing ->
//! optional edge extraction.
//!
//! The chain is assembled once by [`ProcessingChain::assemble`] and then
//! evaluated tile by tile through a [`ChipEvaluator`]. Boundary tracing
//! and ring simplification for the vector product also live here.
//!
//! This crate has **no I/O dependencies**: bands arrive through the
//! [`PixelSource`] trait and results are in-memory images. Reading band
//! files and writing products lives in `shoreline-io`.

pub mod blur;
pub mod chain;
pub mod chip;
pub mod classify;
pub mod config;
pub mod contour;
pub mod edge;
pub mod geometry;
pub mod index;
pub mod simplify;
pub mod source;
pub mod tile;
pub mod types;

pub use chain::{ProcessingChain, SampleFormat, Stage, StageKind};
pub use chip::{Aoi, Chip, ChipEvaluator};
pub use classify::LevelTable;
pub use config::{Algorithm, ColorCoding, Sensor, ShorelineConfig, Threshold};
pub use contour::{BoundaryTracer, BoundaryTracerKind};
pub use geometry::{AffineGeometry, Geometry};
pub use source::{BandStack, PixelSource};
pub use tile::{DEFAULT_TILE_SIZE, TileGrid};
pub use types::{
    BoundaryPolygon, ConfigError, Dimensions, GeoRect, GeometryError, IndexImage,
    PipelineError, PixelRect, Point, Polyline,
};
