//! Pixel sources: where the chain reads its input bands from.

use image::GenericImageView;

use crate::types::{ConfigError, Dimensions, GeometryError, IndexImage, PipelineError, PixelRect};

/// Supplies raw band rasters by index.
///
/// The pipeline declares how many bands it needs and in what order; the
/// source does not interpret the index formula. Implementations must be
/// shareable across threads so independent tile requests can run in
/// parallel.
pub trait PixelSource: Send + Sync {
    /// Number of bands available.
    fn band_count(&self) -> usize;

    /// Dimensions shared by every band.
    fn dimensions(&self) -> Dimensions;

    /// Read `rect` of band `band` as f32 samples.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the band does not exist or `rect`
    /// extends past the raster.
    fn read_band(&self, band: usize, rect: PixelRect) -> Result<IndexImage, PipelineError>;
}

/// In-memory band set: every band fully decoded into an f32 image.
#[derive(Debug, Clone)]
pub struct BandStack {
    bands: Vec<IndexImage>,
    dimensions: Dimensions,
}

impl BandStack {
    /// Create a stack from equally sized bands.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MismatchedBands`] if any band differs in
    /// size from the first.
    pub fn new(bands: Vec<IndexImage>) -> Result<Self, ConfigError> {
        let dimensions = bands.first().map_or(
            Dimensions {
                width: 0,
                height: 0,
            },
            |b| Dimensions {
                width: b.width(),
                height: b.height(),
            },
        );
        for (index, band) in bands.iter().enumerate() {
            if (band.width(), band.height()) != (dimensions.width, dimensions.height) {
                return Err(ConfigError::MismatchedBands {
                    index,
                    expected: dimensions,
                    actual: Dimensions {
                        width: band.width(),
                        height: band.height(),
                    },
                });
            }
        }
        Ok(Self { bands, dimensions })
    }
}

impl PixelSource for BandStack {
    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn read_band(&self, band: usize, rect: PixelRect) -> Result<IndexImage, PipelineError> {
        let image = self
            .bands
            .get(band)
            .ok_or_else(|| PipelineError::Raster(format!("band {band} not available")))?;
        if !rect.fits_within(self.dimensions) {
            return Err(GeometryError::OutOfBounds {
                rect,
                bounds: self.dimensions,
            }
            .into());
        }
        Ok(image
            .view(rect.x, rect.y, rect.width, rect.height)
            .to_image())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn gradient(w: u32, h: u32) -> IndexImage {
        IndexImage::from_fn(w, h, |x, y| image::Luma([(y * w + x) as f32]))
    }

    #[test]
    fn reads_sub_rectangle() {
        let stack = BandStack::new(vec![gradient(4, 3)]).unwrap();
        let tile = stack.read_band(0, PixelRect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(tile.dimensions(), (2, 2));
        assert_eq!(tile.get_pixel(0, 0).0[0], 5.0);
        assert_eq!(tile.get_pixel(1, 1).0[0], 10.0);
    }

    #[test]
    fn out_of_bounds_rect_rejected() {
        let stack = BandStack::new(vec![gradient(4, 3)]).unwrap();
        let err = stack.read_band(0, PixelRect::new(3, 0, 2, 1)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Geometry(GeometryError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn missing_band_rejected() {
        let stack = BandStack::new(vec![gradient(2, 2)]).unwrap();
        assert!(matches!(
            stack.read_band(1, PixelRect::new(0, 0, 1, 1)),
            Err(PipelineError::Raster(_))
        ));
    }

    #[test]
    fn mismatched_bands_rejected() {
        let result = BandStack::new(vec![gradient(2, 2), gradient(3, 2)]);
        assert!(matches!(
            result,
            Err(ConfigError::MismatchedBands { index: 1, .. })
        ));
    }
}
