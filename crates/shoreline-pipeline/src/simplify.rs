//! Boundary simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Traced shoreline rings follow pixel corners and carry a vertex at
//! every step of the staircase. RDP removes vertices that lie within a
//! tolerance of the chord between their neighbours.
//!
//! Closed rings need care: the chord between the first and last point of
//! a ring has zero length. [`simplify_ring`] splits the ring at the
//! vertex farthest from its start, simplifies both halves as open
//! polylines and rejoins them.

use crate::types::{BoundaryPolygon, Point, Polyline};

/// Simplify a closed ring, keeping it closed.
///
/// Rings that would collapse below a triangle (4 points including the
/// closing repeat) are returned unchanged, as are open polylines.
#[must_use = "returns the simplified ring"]
pub fn simplify_ring(ring: &Polyline, tolerance: f64) -> Polyline {
    if !ring.is_closed() || ring.len() < 5 || tolerance <= 0.0 {
        return ring.clone();
    }
    let points = ring.points();
    let start = points[0];
    let split = points
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| distance(**a, start).total_cmp(&distance(**b, start)))
        .map_or(points.len() / 2, |(i, _)| i);

    let mut joined = simplify_points(&points[..=split], tolerance);
    let tail = simplify_points(&points[split..], tolerance);
    // The split vertex ends the first half and starts the second.
    joined.extend(tail.into_iter().skip(1));

    if joined.len() < 4 {
        return ring.clone();
    }
    Polyline::new(joined)
}

/// Simplify every ring of a polygon. Holes that collapse are kept as
/// they were.
#[must_use = "returns the simplified polygon"]
pub fn simplify_polygon(polygon: &BoundaryPolygon, tolerance: f64) -> BoundaryPolygon {
    BoundaryPolygon {
        exterior: simplify_ring(&polygon.exterior, tolerance),
        holes: polygon
            .holes
            .iter()
            .map(|h| simplify_ring(h, tolerance))
            .collect(),
    }
}

/// RDP over an open run of points. Runs shorter than 3 points are
/// returned unchanged.
fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Keep the point between `start` and `end` farthest from their chord if
/// it lies beyond `tolerance`, then recurse into both halves.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Distance from `p` to the line through `a` and `b`, or to `a` when the
/// two coincide.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return distance(p, a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
