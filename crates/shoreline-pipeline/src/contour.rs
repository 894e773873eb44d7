//! Boundary tracing: extract water polygons from a classified bitmap.
//!
//! This module defines the [`BoundaryTracer`] trait for pluggable tracing
//! algorithms and the [`BoundaryTracerKind`] enum for selecting one at
//! runtime.
//!
//! Pixels equal to the foreground level (the water colour) form the
//! regions; everything else is background. Each outer border becomes the
//! exterior ring of a [`BoundaryPolygon`] and each hole border (land
//! enclosed by water) is attached to the polygon it lies in.
//!
//! The mask is traced with a one-pixel background frame around it, so
//! water running off the raster edge still has an outer border. That
//! border follows the outermost pixel centres along the edge.
//!
//! Coordinates are pixel centres in pixel-corner space, i.e. the pixel at
//! column `c`, row `r` contributes the vertex `(c + 0.5, r + 0.5)`.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::{BoundaryPolygon, IndexImage, Point, Polyline};

/// Selects which tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    #[default]
    BorderFollowing,
}

/// Trait for boundary tracing strategies.
pub trait BoundaryTracer {
    /// Trace the regions of `raster` whose samples equal `foreground`.
    fn trace(&self, raster: &IndexImage, foreground: f32) -> Vec<BoundaryPolygon>;
}

impl BoundaryTracer for BoundaryTracerKind {
    fn trace(&self, raster: &IndexImage, foreground: f32) -> Vec<BoundaryPolygon> {
        match *self {
            Self::BorderFollowing => trace_polygons(raster, foreground),
        }
    }
}

/// Trace polygons with Suzuki-Abe border following.
///
/// Contours with fewer than 3 points (single pixels and one-pixel lines)
/// are dropped, as are holes whose enclosing border was dropped.
#[must_use = "returns the traced polygons"]
pub fn trace_polygons(raster: &IndexImage, foreground: f32) -> Vec<BoundaryPolygon> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mask = GrayImage::from_fn(width + 2, height + 2, |x, y| {
        let inside = (1..=width).contains(&x) && (1..=height).contains(&y);
        image::Luma([
            if inside && raster.get_pixel(x - 1, y - 1).0[0] == foreground {
                255
            } else {
                0
            },
        ])
    });
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(&mask);
    let unpad = |p: &imageproc::point::Point<u32>| {
        Point::new(
            f64::from(p.x.saturating_sub(1).min(width - 1)) + 0.5,
            f64::from(p.y.saturating_sub(1).min(height - 1)) + 0.5,
        )
    };

    // contour index -> polygon index, for outer borders that were kept
    let mut owner: Vec<Option<usize>> = vec![None; contours.len()];
    let mut polygons = Vec::new();
    for (i, contour) in contours.iter().enumerate() {
        if contour.border_type == BorderType::Outer && contour.points.len() >= 3 {
            owner[i] = Some(polygons.len());
            polygons.push(BoundaryPolygon {
                exterior: closed_ring(contour.points.iter().map(unpad)),
                holes: Vec::new(),
            });
        }
    }
    for contour in &contours {
        if contour.border_type != BorderType::Hole || contour.points.len() < 3 {
            continue;
        }
        if let Some(index) = contour.parent.and_then(|p| owner.get(p).copied().flatten()) {
            polygons[index]
                .holes
                .push(closed_ring(contour.points.iter().map(unpad)));
        }
    }
    polygons
}

fn closed_ring(points: impl Iterator<Item = Point>) -> Polyline {
    let mut ring: Vec<Point> = points.collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    Polyline::new(ring)
}
