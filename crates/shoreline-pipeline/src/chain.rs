//! Processing chain assembly and tile evaluation.
//!
//! A [`ProcessingChain`] is an ordered list of [`Stage`]s built once from
//! a [`ShorelineConfig`] and a band source:
//!
//! 1. [`Stage::Index`]: band math (always present)
//! 2. [`Stage::Classify`]: hysteresis lookup table (unless skipped)
//! 3. [`Stage::Smooth`]: Gaussian blur (iff sigma > 0)
//! 4. [`Stage::Edge`]: Roberts edge map (iff edge detection requested)
//!
//! The chain is immutable after assembly and evaluation is a pure
//! function of the requested rectangle, so one chain can serve any
//! number of chip evaluators, including concurrently.
//!
//! # Tile context
//!
//! Smoothing and edge detection read neighbouring pixels. To make a
//! tile's pixels identical to the same pixels of a whole-raster run, the
//! chain reads the bands over the requested rectangle grown by
//! [`ProcessingChain::halo`] (clamped to the raster), runs every stage on
//! that larger tile, and crops the result back.

use std::fmt;
use std::sync::Arc;

use image::GenericImageView;
use log::debug;

use crate::chip::Aoi;
use crate::classify::LevelTable;
use crate::config::{Algorithm, Sensor, ShorelineConfig, Threshold};
use crate::types::{ConfigError, GeometryError, IndexImage, PipelineError, PixelRect};
use crate::source::PixelSource;

/// Identifies a stage without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Band math.
    Index,
    /// Hysteresis classification.
    Classify,
    /// Gaussian smoothing.
    Smooth,
    /// Edge extraction.
    Edge,
}

/// One step of the processing chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Compute the water index from the listed source bands, in order.
    Index {
        /// Formula to apply.
        algorithm: Algorithm,
        /// Source band numbers feeding the formula.
        bands: Vec<usize>,
    },
    /// Map index values through the level lookup table.
    Classify(LevelTable),
    /// Gaussian blur with the given sigma (always > 0).
    Smooth {
        /// Filter standard deviation in pixels.
        sigma: f32,
    },
    /// Roberts cross edge magnitude.
    Edge,
}

impl Stage {
    /// The stage's kind.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Index { .. } => StageKind::Index,
            Self::Classify(_) => StageKind::Classify,
            Self::Smooth { .. } => StageKind::Smooth,
            Self::Edge => StageKind::Edge,
        }
    }

    /// Neighbouring pixels this stage reads on each side.
    #[must_use]
    pub fn context(&self) -> u32 {
        match self {
            Self::Index { .. } | Self::Classify(_) => 0,
            Self::Smooth { sigma } => crate::blur::kernel_radius(*sigma),
            Self::Edge => crate::edge::CONTEXT,
        }
    }

    /// Apply a per-tile stage to the output of the previous stage.
    ///
    /// The index stage reads from the pixel source instead and is
    /// handled by [`ProcessingChain::tile`]; here it passes the tile
    /// through.
    #[must_use = "returns the processed tile"]
    pub fn apply(&self, tile: IndexImage) -> IndexImage {
        match self {
            Self::Index { .. } => tile,
            Self::Classify(table) => table.apply(&tile),
            Self::Smooth { sigma } => crate::blur::gaussian_blur(&tile, *sigma),
            Self::Edge => crate::edge::roberts(&tile),
        }
    }
}

/// Sample format of the chain's output raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 8-bit levels (classification ran).
    U8,
    /// Continuous 32-bit float (thresholding skipped).
    F32,
}

/// An assembled, immutable processing chain bound to its band source.
pub struct ProcessingChain {
    source: Arc<dyn PixelSource>,
    stages: Vec<Stage>,
}

impl fmt::Debug for ProcessingChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingChain")
            .field("stages", &self.stages)
            .field("dimensions", &self.source.dimensions())
            .finish_non_exhaustive()
    }
}

impl ProcessingChain {
    /// Assemble the chain for `config` over `source`.
    ///
    /// `aoi` is the area of interest the run will cover; it is validated
    /// here so a run with undefined bounds fails before any raster work.
    ///
    /// Extra bands beyond what the algorithm needs are accepted; the
    /// first [`Algorithm::required_bands`] bands are used in order.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::UndefinedBounds`] if `aoi` contains NaNs.
    /// - [`ConfigError::UnsupportedSensor`] for a sensor other than `ls8`.
    /// - [`ConfigError::BandCount`] if the source has too few bands.
    /// - Any [`ShorelineConfig::validate`] or [`LevelTable::new`] error.
    pub fn assemble(
        config: &ShorelineConfig,
        source: Arc<dyn PixelSource>,
        aoi: &Aoi,
    ) -> Result<Self, PipelineError> {
        aoi.validate()?;
        let sensor: Sensor = config.sensor.parse()?;
        config.validate()?;

        let required = config.algorithm.required_bands();
        let available = source.band_count();
        if available < required {
            return Err(ConfigError::BandCount {
                algorithm: config.algorithm,
                expected: required,
                actual: available,
            }
            .into());
        }
        if available > required {
            debug!(
                "{} uses {required} of {available} input bands; ignoring the rest",
                config.algorithm
            );
        }

        let mut stages = vec![Stage::Index {
            algorithm: config.algorithm,
            bands: (0..required).collect(),
        }];
        if let Threshold::Level(threshold) = config.threshold {
            stages.push(Stage::Classify(LevelTable::new(
                threshold,
                config.tolerance,
                config.color_coding,
            )?));
        }
        if config.smoothing > 0.0 {
            stages.push(Stage::Smooth {
                sigma: config.smoothing,
            });
        }
        if config.do_edge_detect {
            stages.push(Stage::Edge);
        }

        debug!(
            "assembled {} chain for sensor {}: {:?}",
            config.algorithm,
            sensor.id(),
            stages.iter().map(Stage::kind).collect::<Vec<_>>()
        );
        Ok(Self { source, stages })
    }

    /// The stages in evaluation order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The kinds of the stages in evaluation order.
    #[must_use]
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    /// The band source the chain reads from.
    #[must_use]
    pub fn source(&self) -> &dyn PixelSource {
        self.source.as_ref()
    }

    /// Context margin needed around a tile, in pixels.
    #[must_use]
    pub fn halo(&self) -> u32 {
        self.stages.iter().map(Stage::context).sum()
    }

    /// Output sample format: 8-bit when classification ran, f32 otherwise.
    #[must_use]
    pub fn sample_format(&self) -> SampleFormat {
        if self.stages.iter().any(|s| s.kind() == StageKind::Classify) {
            SampleFormat::U8
        } else {
            SampleFormat::F32
        }
    }

    /// Evaluate the chain over `rect`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfBounds`] if `rect` extends past the
    /// raster, [`ConfigError`] if the band tiles do not fit the formula,
    /// or any error from the pixel source.
    pub fn tile(&self, rect: PixelRect) -> Result<IndexImage, PipelineError> {
        let dims = self.source.dimensions();
        if !rect.fits_within(dims) {
            return Err(GeometryError::OutOfBounds { rect, bounds: dims }.into());
        }

        let read = rect.expand_within(self.halo(), dims);
        let mut current: Option<IndexImage> = None;
        for stage in &self.stages {
            current = Some(match (stage, current) {
                (Stage::Index { algorithm, bands }, _) => {
                    let tiles = bands
                        .iter()
                        .map(|&b| self.source.read_band(b, read))
                        .collect::<Result<Vec<_>, _>>()?;
                    crate::index::compute_index(*algorithm, &tiles)?
                }
                (stage, Some(tile)) => stage.apply(tile),
                (_, None) => {
                    return Err(PipelineError::Raster(
                        "processing chain does not start with an index stage".to_string(),
                    ));
                }
            });
        }
        let full = current.ok_or_else(|| PipelineError::Raster("empty processing chain".to_string()))?;

        if read == rect {
            return Ok(full);
        }
        Ok(full
            .view(rect.x - read.x, rect.y - read.y, rect.width, rect.height)
            .to_image())
    }
}
