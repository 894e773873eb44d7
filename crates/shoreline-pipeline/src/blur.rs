//! Gaussian smoothing to reduce speckle in the index or classified
//! raster.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`], a separable filter
//! that clamps reads at the image border.

use crate::types::IndexImage;

/// Apply Gaussian blur to a floating-point tile.
///
/// Non-positive sigma values return the tile unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the smoothed tile"]
pub fn gaussian_blur(tile: &IndexImage, sigma: f32) -> IndexImage {
    if sigma <= 0.0 {
        return tile.clone();
    }

    imageproc::filter::gaussian_blur_f32(tile, sigma)
}

/// Number of neighbouring pixels on each side that contribute to a
/// blurred pixel.
///
/// `ceil(3σ)` bounds the kernel radius `imageproc` uses, so it is a
/// sufficient context margin for a tile's blurred interior to equal the
/// whole-raster result.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn kernel_radius(sigma: f32) -> u32 {
    if sigma <= 0.0 {
        return 0;
    }
    (3.0 * sigma).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test tile with a sharp 0-to-1 boundary at x=5.
    fn sharp_edge_tile() -> IndexImage {
        IndexImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Luma([0.0])
            } else {
                image::Luma([1.0])
            }
        })
    }

    #[test]
    fn zero_sigma_returns_identical_tile() {
        let tile = sharp_edge_tile();
        assert_eq!(gaussian_blur(&tile, 0.0), tile);
    }

    #[test]
    fn output_dimensions_preserved() {
        let tile = IndexImage::new(17, 31);
        let blurred = gaussian_blur(&tile, 1.4);
        assert_eq!(blurred.dimensions(), (17, 31));
    }

    #[test]
    fn blur_smooths_sharp_edge() {
        let blurred = gaussian_blur(&sharp_edge_tile(), 2.0);
        let left = blurred.get_pixel(4, 5).0[0];
        let right = blurred.get_pixel(5, 5).0[0];
        assert!(left > 0.0, "expected blur to raise left-of-edge, got {left}");
        assert!(right < 1.0, "expected blur to lower right-of-edge, got {right}");
    }

    #[test]
    fn uniform_tile_unchanged_by_blur() {
        let tile = IndexImage::from_pixel(10, 10, image::Luma([128.0]));
        let blurred = gaussian_blur(&tile, 1.4);
        for pixel in blurred.pixels() {
            assert!((pixel.0[0] - 128.0).abs() < 1e-3, "got {}", pixel.0[0]);
        }
    }

    #[test]
    fn kernel_radius_follows_sigma() {
        assert_eq!(kernel_radius(0.0), 0);
        assert_eq!(kernel_radius(0.2), 1);
        assert_eq!(kernel_radius(1.4), 5);
    }
}
