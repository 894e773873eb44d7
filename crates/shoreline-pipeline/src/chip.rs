//! Chip evaluation: one processed tile per pixel rectangle.
//!
//! A request carries its own [`Aoi`] from start to finish. The evaluator
//! holds nothing mutable, so a single [`ChipEvaluator`] can serve
//! concurrent callers.

use crate::chain::ProcessingChain;
use crate::geometry::Geometry;
use crate::types::{GeoRect, GeometryError, IndexImage, PipelineError, PixelRect};

/// Area of interest: a pixel rectangle and its ground footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aoi {
    /// Requested pixel rectangle.
    pub pixel: PixelRect,
    /// World bounds of `pixel`.
    pub ground: GeoRect,
}

impl Aoi {
    /// Derive the AOI for `pixel` through `geometry`.
    #[must_use]
    pub fn from_pixel(pixel: PixelRect, geometry: &dyn Geometry) -> Self {
        Self {
            pixel,
            ground: geometry.local_to_world(pixel),
        }
    }

    /// # Errors
    ///
    /// Returns [`GeometryError::UndefinedBounds`] if the ground bounds
    /// contain NaN.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.ground.has_nans() {
            return Err(GeometryError::UndefinedBounds {
                pixel: self.pixel,
                ground: self.ground,
            });
        }
        Ok(())
    }
}

/// A processed tile with the AOI it was evaluated for.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    /// Where the tile lies, in pixels and on the ground.
    pub aoi: Aoi,
    /// Chain output over `aoi.pixel`.
    pub tile: IndexImage,
}

/// Evaluates a [`ProcessingChain`] over requested rectangles.
#[derive(Clone, Copy)]
pub struct ChipEvaluator<'a> {
    chain: &'a ProcessingChain,
    geometry: Option<&'a dyn Geometry>,
}

impl std::fmt::Debug for ChipEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChipEvaluator")
            .field("chain", self.chain)
            .field("has_geometry", &self.geometry.is_some())
            .finish()
    }
}

impl<'a> ChipEvaluator<'a> {
    /// Create an evaluator. Without a geometry every request yields
    /// `None`.
    #[must_use]
    pub const fn new(chain: &'a ProcessingChain, geometry: Option<&'a dyn Geometry>) -> Self {
        Self { chain, geometry }
    }

    /// Evaluate the chain over `rect`.
    ///
    /// Returns `Ok(None)` when the evaluator has no geometry.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::UndefinedBounds`] if the ground bounds of
    ///   `rect` contain NaN.
    /// - Any error from [`ProcessingChain::tile`].
    pub fn get_chip(&self, rect: PixelRect) -> Result<Option<Chip>, PipelineError> {
        let Some(geometry) = self.geometry else {
            return Ok(None);
        };
        let aoi = Aoi::from_pixel(rect, geometry);
        aoi.validate()?;
        let tile = self.chain.tile(aoi.pixel)?;
        Ok(Some(Chip { aoi, tile }))
    }
}
