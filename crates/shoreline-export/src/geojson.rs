//! GeoJSON export serializer.
//!
//! Converts boundary polygons into a GeoJSON `FeatureCollection` with one
//! `Polygon` feature per water body. The exterior ring comes first,
//! followed by its holes, as RFC 7946 requires.
//!
//! Coordinates are written as given; callers map pixel positions to world
//! coordinates beforehand.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use serde_json::{Value, json};

use shoreline_pipeline::{BoundaryPolygon, Polyline};

/// Metadata to embed in the collection.
///
/// Both fields are optional and are omitted from the output when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonMetadata<'a> {
    /// Collection name, emitted as the top-level `"name"` member.
    ///
    /// Typically the raster product's file stem.
    pub name: Option<&'a str>,

    /// Pixel value the polygons were traced from, emitted as the
    /// `"level"` property of every feature.
    pub level: Option<u8>,
}

/// Serialize polygons as a pretty-printed GeoJSON `FeatureCollection`.
///
/// Rings with fewer than 4 positions (not a closed triangle) are not
/// valid GeoJSON linear rings and are skipped; a polygon whose exterior
/// is skipped is dropped entirely.
///
/// # Examples
///
/// ```
/// use shoreline_pipeline::{BoundaryPolygon, Point, Polyline};
/// use shoreline_export::{GeoJsonMetadata, to_geojson};
///
/// let square = Polyline::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 0.0),
/// ]);
/// let json = to_geojson(
///     &[BoundaryPolygon { exterior: square, holes: vec![] }],
///     &GeoJsonMetadata::default(),
/// );
/// assert!(json.contains("\"FeatureCollection\""));
/// ```
#[must_use]
pub fn to_geojson(polygons: &[BoundaryPolygon], metadata: &GeoJsonMetadata<'_>) -> String {
    let features: Vec<Value> = polygons
        .iter()
        .filter(|p| is_linear_ring(&p.exterior))
        .enumerate()
        .map(|(id, polygon)| {
            let rings: Vec<Value> = std::iter::once(&polygon.exterior)
                .chain(polygon.holes.iter().filter(|h| is_linear_ring(h)))
                .map(ring_coordinates)
                .collect();
            let mut properties = json!({ "id": id });
            if let Some(level) = metadata.level {
                properties["level"] = json!(level);
            }
            json!({
                "type": "Feature",
                "properties": properties,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": rings,
                },
            })
        })
        .collect();

    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(name) = metadata.name {
        collection["name"] = json!(name);
    }
    format!("{collection:#}")
}

fn is_linear_ring(ring: &Polyline) -> bool {
    ring.len() >= 4 && ring.is_closed()
}

fn ring_coordinates(ring: &Polyline) -> Value {
    Value::Array(ring.points().iter().map(|p| json!([p.x, p.y])).collect())
}
