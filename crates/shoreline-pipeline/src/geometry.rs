//! Pixel-to-world geometry.
//!
//! The chip evaluator only needs `local_to_world`; everything else about
//! projections stays behind the [`Geometry`] trait.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GeoRect, PixelRect, Point};

/// Maps pixel coordinates of a raster to world coordinates.
pub trait Geometry: Send + Sync {
    /// Size of the raster the geometry describes.
    fn image_size(&self) -> Dimensions;

    /// World position of a pixel-space point (pixel corners are at
    /// integer coordinates).
    fn pixel_to_world(&self, p: Point) -> Point;

    /// World bounding rectangle of a pixel rectangle.
    ///
    /// The default transforms the four corners and takes their extent,
    /// which is exact for affine transforms.
    fn local_to_world(&self, rect: PixelRect) -> GeoRect {
        let x0 = f64::from(rect.x);
        let y0 = f64::from(rect.y);
        let x1 = x0 + f64::from(rect.width);
        let y1 = y0 + f64::from(rect.height);
        let corners = [
            self.pixel_to_world(Point::new(x0, y0)),
            self.pixel_to_world(Point::new(x1, y0)),
            self.pixel_to_world(Point::new(x0, y1)),
            self.pixel_to_world(Point::new(x1, y1)),
        ];
        // f64::min/max ignore NaN, so fold NaN in explicitly.
        let extent = |pick: fn(&Point) -> f64, take_min: bool| {
            corners.iter().map(pick).fold(
                if take_min {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                },
                |acc, v| {
                    if v.is_nan() || acc.is_nan() {
                        f64::NAN
                    } else if take_min {
                        acc.min(v)
                    } else {
                        acc.max(v)
                    }
                },
            )
        };
        GeoRect {
            min_x: extent(|p| p.x, true),
            min_y: extent(|p| p.y, true),
            max_x: extent(|p| p.x, false),
            max_y: extent(|p| p.y, false),
        }
    }
}

/// Six-coefficient affine geotransform in GDAL order:
///
/// ```text
/// X = c[0] + col * c[1] + row * c[2]
/// Y = c[3] + col * c[4] + row * c[5]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineGeometry {
    coefficients: [f64; 6],
    size: Dimensions,
}

impl AffineGeometry {
    /// Create a geometry from geotransform coefficients.
    #[must_use]
    pub const fn new(coefficients: [f64; 6], size: Dimensions) -> Self {
        Self { coefficients, size }
    }

    /// Identity transform: world coordinates equal pixel coordinates.
    #[must_use]
    pub const fn identity(size: Dimensions) -> Self {
        Self::new([0.0, 1.0, 0.0, 0.0, 0.0, 1.0], size)
    }

    /// North-up transform stretching the raster over `bounds`.
    #[must_use]
    pub fn from_bounds(bounds: GeoRect, size: Dimensions) -> Self {
        let w = f64::from(size.width.max(1));
        let h = f64::from(size.height.max(1));
        Self::new(
            [
                bounds.min_x,
                (bounds.max_x - bounds.min_x) / w,
                0.0,
                bounds.max_y,
                0.0,
                -(bounds.max_y - bounds.min_y) / h,
            ],
            size,
        )
    }

    /// The geotransform coefficients.
    #[must_use]
    pub const fn coefficients(&self) -> [f64; 6] {
        self.coefficients
    }

    /// Update the raster size the geometry describes.
    pub const fn set_image_size(&mut self, size: Dimensions) {
        self.size = size;
    }
}

impl Geometry for AffineGeometry {
    fn image_size(&self) -> Dimensions {
        self.size
    }

    fn pixel_to_world(&self, p: Point) -> Point {
        let c = &self.coefficients;
        Point::new(
            c[2].mul_add(p.y, c[1].mul_add(p.x, c[0])),
            c[5].mul_add(p.y, c[4].mul_add(p.x, c[3])),
        )
    }
}
