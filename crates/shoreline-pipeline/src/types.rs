//! Shared types for the shoreline raster pipeline.

use serde::{Deserialize, Serialize};

use crate::config::Algorithm;

/// Single-band floating-point raster used for every intermediate tile.
///
/// Index values, classified levels, smoothed values and edge magnitudes
/// all travel through the chain in this representation; conversion to
/// the 8-bit product happens only when the raster is written.
pub type IndexImage = image::ImageBuffer<image::Luma<f32>, Vec<f32>>;

/// A 2D point in pixel or world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (column, or easting/longitude in world space).
    pub x: f64,
    /// Vertical position (row, or northing/latitude in world space).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A sequence of connected points. Polygon rings are stored closed
/// (first point repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Whether the first and last points coincide.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(a), Some(b)) => self.0.len() > 1 && a == b,
            _ => false,
        }
    }

    /// Apply `f` to every point, returning a new polyline.
    #[must_use]
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.iter().map(|&p| f(p)).collect())
    }
}

/// A polygon with one exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    /// Outer boundary (closed ring).
    pub exterior: Polyline,
    /// Inner boundaries (closed rings), e.g. islands inside a lake.
    pub holes: Vec<Polyline>,
}

/// Raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// The rectangle covering the whole raster.
    #[must_use]
    pub const fn full_rect(self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Size of the rectangle.
    #[must_use]
    pub const fn size(self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies entirely inside a raster of `dims`.
    #[must_use]
    pub const fn fits_within(self, dims: Dimensions) -> bool {
        self.right() <= dims.width as u64 && self.bottom() <= dims.height as u64
    }

    /// Grow the rectangle by `margin` pixels on every side, clamped to
    /// the raster bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn expand_within(self, margin: u32, dims: Dimensions) -> Self {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        let right = (self.right() + u64::from(margin)).min(u64::from(dims.width));
        let bottom = (self.bottom() + u64::from(margin)).min(u64::from(dims.height));
        // Both bounds are clamped to u32 dimensions above.
        Self::new(x, y, (right - u64::from(x)) as u32, (bottom - u64::from(y)) as u32)
    }
}

/// An axis-aligned rectangle in world (geodetic) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    /// Minimum x (west).
    pub min_x: f64,
    /// Minimum y (south).
    pub min_y: f64,
    /// Maximum x (east).
    pub max_x: f64,
    /// Maximum y (north).
    pub max_y: f64,
}

impl GeoRect {
    /// Returns `true` if any bound is NaN.
    #[must_use]
    pub const fn has_nans(&self) -> bool {
        self.min_x.is_nan() || self.min_y.is_nan() || self.max_x.is_nan() || self.max_y.is_nan()
    }
}

/// Errors raised while validating the configuration or input bands.
///
/// These are detected during chain assembly, before any raster work
/// begins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The algorithm keyword is not one of `ndwi` or `awei`.
    #[error("unsupported algorithm <{0}>, expected \"ndwi\" or \"awei\"")]
    UnsupportedAlgorithm(String),

    /// The sensor identifier has no band profile.
    #[error("sensor <{0}> not supported")]
    UnsupportedSensor(String),

    /// The colour coding is not three 0-255 integers.
    #[error("color coding must be three 0-255 values \"<water> <marginal> <land>\", got <{0}>")]
    ColorCoding(String),

    /// Fewer (or, for the calculator itself, a different number of)
    /// input bands than the algorithm requires.
    #[error("{algorithm} expected {expected} input bands but found {actual}")]
    BandCount {
        /// Algorithm needing the bands.
        algorithm: Algorithm,
        /// Bands required.
        expected: usize,
        /// Bands supplied.
        actual: usize,
    },

    /// Input bands do not share the same dimensions.
    #[error("input band {index} is {actual:?}, expected {expected:?}")]
    MismatchedBands {
        /// Offending band position.
        index: usize,
        /// Dimensions of the first band.
        expected: Dimensions,
        /// Dimensions of the offending band.
        actual: Dimensions,
    },

    /// Threshold outside `[0, 1]` or not parseable.
    #[error("threshold must be in [0, 1] or \"X\" to skip, got <{0}>")]
    Threshold(String),

    /// Negative or non-finite tolerance.
    #[error("tolerance must be a finite value >= 0, got {0}")]
    Tolerance(f64),

    /// Negative or non-finite smoothing sigma.
    #[error("smoothing sigma must be a finite value >= 0, got {0}")]
    Smoothing(f32),

    /// Threshold +- tolerance is not a finite, ordered range.
    #[error("tolerance band [{low}, {high}] is not a finite range")]
    ToleranceBand {
        /// `threshold - tolerance`.
        low: f64,
        /// `threshold + tolerance`.
        high: f64,
    },
}

/// Errors in the area-of-interest geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The pixel or ground rectangle has NaN bounds.
    #[error("encountered NaNs in AOI (pixel {pixel:?}, ground {ground:?})")]
    UndefinedBounds {
        /// Requested pixel rectangle.
        pixel: PixelRect,
        /// Derived ground rectangle.
        ground: GeoRect,
    },

    /// The requested rectangle extends past the raster.
    #[error("requested rectangle {rect:?} exceeds raster bounds {bounds:?}")]
    OutOfBounds {
        /// Requested rectangle.
        rect: PixelRect,
        /// Raster dimensions.
        bounds: Dimensions,
    },
}

/// Errors that can occur while assembling or evaluating the chain.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration or band set.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid area of interest.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Chain evaluation failed while producing a tile.
    #[error("raster evaluation failed: {0}")]
    Raster(String),
}
