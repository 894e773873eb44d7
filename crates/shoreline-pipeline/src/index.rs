//! Water index band math.
//!
//! Combines the input band tiles pixel by pixel into a single f32 band.
//! The formulas are the Landsat 8 profile, the only sensor defined:
//!
//! - NDWI: `b0 / (b0 + b1)`
//! - AWEI: `4*(b0+b1) - 0.25*b2 - 2.75*b3`
//!
//! NDWI of two zero bands is `0/0 = NaN`; the classifier maps NaN to land.

use crate::config::Algorithm;
use crate::types::{ConfigError, Dimensions, IndexImage};

/// Compute the water index for one tile.
///
/// `bands` must contain exactly [`Algorithm::required_bands`] tiles of
/// equal size, in formula order.
///
/// # Errors
///
/// Returns [`ConfigError::BandCount`] if the number of tiles does not
/// match the algorithm, and [`ConfigError::MismatchedBands`] if the tiles
/// differ in size.
pub fn compute_index(algorithm: Algorithm, bands: &[IndexImage]) -> Result<IndexImage, ConfigError> {
    let expected = algorithm.required_bands();
    if bands.len() != expected {
        return Err(ConfigError::BandCount {
            algorithm,
            expected,
            actual: bands.len(),
        });
    }

    let first = &bands[0];
    let dims = Dimensions {
        width: first.width(),
        height: first.height(),
    };
    for (index, band) in bands.iter().enumerate().skip(1) {
        if band.dimensions() != first.dimensions() {
            return Err(ConfigError::MismatchedBands {
                index,
                expected: dims,
                actual: Dimensions {
                    width: band.width(),
                    height: band.height(),
                },
            });
        }
    }

    let raws: Vec<&[f32]> = bands.iter().map(|b| b.as_raw().as_slice()).collect();
    let data: Vec<f32> = (0..first.as_raw().len())
        .map(|i| match algorithm {
            Algorithm::Ndwi => ndwi(raws[0][i], raws[1][i]),
            Algorithm::Awei => awei(raws[0][i], raws[1][i], raws[2][i], raws[3][i]),
        })
        .collect();

    IndexImage::from_raw(dims.width, dims.height, data)
        .ok_or(ConfigError::MismatchedBands {
            index: 0,
            expected: dims,
            actual: dims,
        })
}

/// Normalized Difference Water Index for one pixel.
#[must_use]
pub fn ndwi(b0: f32, b1: f32) -> f32 {
    b0 / (b0 + b1)
}

/// Automated Water Extraction Index for one pixel.
#[must_use]
pub fn awei(b0: f32, b1: f32, b2: f32, b3: f32) -> f32 {
    2.75f32.mul_add(-b3, 4.0f32.mul_add(b0 + b1, -0.25 * b2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn constant(w: u32, h: u32, v: f32) -> IndexImage {
        IndexImage::from_pixel(w, h, image::Luma([v]))
    }

    #[test]
    fn ndwi_ratio() {
        let out = compute_index(Algorithm::Ndwi, &[constant(3, 2, 3.0), constant(3, 2, 1.0)])
            .unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        for p in out.pixels() {
            assert!((p.0[0] - 0.75).abs() < 1e-7);
        }
    }

    #[test]
    fn awei_matches_formula() {
        let bands = [
            constant(2, 2, 0.5),
            constant(2, 2, 0.5),
            constant(2, 2, 0.2),
            constant(2, 2, 0.1),
        ];
        let out = compute_index(Algorithm::Awei, &bands).unwrap();
        for p in out.pixels() {
            assert!((f64::from(p.0[0]) - 3.675).abs() < 1e-6, "got {}", p.0[0]);
        }
    }

    #[test]
    fn ndwi_of_zero_bands_is_nan() {
        assert!(ndwi(0.0, 0.0).is_nan());
    }

    #[test]
    fn wrong_band_count_names_expected_and_actual() {
        let err = compute_index(Algorithm::Ndwi, &[constant(1, 1, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BandCount {
                algorithm: Algorithm::Ndwi,
                expected: 2,
                actual: 1
            }
        );

        let three = [constant(1, 1, 1.0), constant(1, 1, 1.0), constant(1, 1, 1.0)];
        assert!(compute_index(Algorithm::Ndwi, &three).is_err());
    }

    #[test]
    fn mismatched_tiles_rejected() {
        let err = compute_index(Algorithm::Ndwi, &[constant(2, 2, 1.0), constant(3, 2, 1.0)])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MismatchedBands { index: 1, .. }));
    }
}
