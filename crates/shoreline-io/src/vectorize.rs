//! Vectorization capability: raster product in, polygon product out.
//!
//! Vectorizers are looked up by name in a [`VectorizerRegistry`]. A run
//! whose registry lacks the requested name still keeps its raster
//! product; the orchestrator reports the vector stage as unavailable.
//!
//! The built-in [`ContourVectorizer`] traces the water level of the
//! product with Suzuki-Abe border following and writes GeoJSON.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use shoreline_export::{GeoJsonMetadata, to_geojson};
use shoreline_pipeline::simplify::simplify_polygon;
use shoreline_pipeline::{BoundaryPolygon, BoundaryTracer, BoundaryTracerKind, Geometry};

use crate::bands::read_tiff;
use crate::error::VectorizeError;
use crate::output::VectorTarget;

/// Name of the built-in contour vectorizer.
pub const CONTOUR_VECTORIZER: &str = "contour";

/// Shape of the vector product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorMode {
    /// Closed polygons around water bodies, with holes for islands.
    #[default]
    Polygon,
}

/// Everything a vectorizer needs for one run.
#[derive(Clone, Copy)]
pub struct VectorizeRequest<'a> {
    /// Raster product to read.
    pub raster: &'a Path,
    /// Where the vector product goes.
    pub output: &'a VectorTarget,
    /// Shape of the vector product.
    pub mode: VectorMode,
    /// Raster level marking the regions to trace (the water colour).
    pub foreground: u8,
    /// Pixel-to-world mapping; pixel coordinates are written without one.
    pub geometry: Option<&'a dyn Geometry>,
    /// Ramer-Douglas-Peucker tolerance in pixels; 0 keeps every vertex.
    pub simplify_tolerance: f64,
}

impl std::fmt::Debug for VectorizeRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorizeRequest")
            .field("raster", &self.raster)
            .field("output", &self.output)
            .field("mode", &self.mode)
            .field("foreground", &self.foreground)
            .field("has_geometry", &self.geometry.is_some())
            .field("simplify_tolerance", &self.simplify_tolerance)
            .finish()
    }
}

/// Result of a successful vectorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSummary {
    /// Polygons written.
    pub polygons: usize,
}

/// Turns a raster product into a vector product.
pub trait Vectorizer {
    /// Registry name of this vectorizer.
    fn name(&self) -> &str;

    /// Vectorize `request.raster` into `request.output`. Console output
    /// goes to `console`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorizeError`] if the raster cannot be read or the
    /// product cannot be written.
    fn vectorize(
        &self,
        request: &VectorizeRequest<'_>,
        console: &mut dyn Write,
    ) -> Result<VectorSummary, VectorizeError>;
}

/// Constructor stored in the registry.
pub type VectorizerFactory = fn() -> Box<dyn Vectorizer>;

/// Name-to-factory table of available vectorizers.
#[derive(Debug, Clone)]
pub struct VectorizerRegistry {
    factories: BTreeMap<String, VectorizerFactory>,
}

impl VectorizerRegistry {
    /// A registry with no vectorizers.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: VectorizerFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiate the vectorizer registered as `name`.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Box<dyn Vectorizer>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for VectorizerRegistry {
    /// The built-in vectorizers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CONTOUR_VECTORIZER, contour_factory);
        registry
    }
}

fn contour_factory() -> Box<dyn Vectorizer> {
    Box::new(ContourVectorizer::default())
}

/// Traces water regions of the raster product into GeoJSON polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourVectorizer {
    tracer: BoundaryTracerKind,
}

impl ContourVectorizer {
    /// Create a vectorizer using `tracer`.
    #[must_use]
    pub const fn new(tracer: BoundaryTracerKind) -> Self {
        Self { tracer }
    }

    /// Trace, simplify and georeference the polygons of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorizeError::Raster`] if the raster cannot be read.
    pub fn polygons(&self, request: &VectorizeRequest<'_>) -> Result<Vec<BoundaryPolygon>, VectorizeError> {
        let raster = read_tiff(request.raster)?;
        let mut polygons = match request.mode {
            VectorMode::Polygon => self.tracer.trace(&raster, f32::from(request.foreground)),
        };
        debug!(
            "traced {} polygons at level {} in <{}>",
            polygons.len(),
            request.foreground,
            request.raster.display()
        );
        if request.simplify_tolerance > 0.0 {
            polygons = polygons
                .iter()
                .map(|p| simplify_polygon(p, request.simplify_tolerance))
                .collect();
        }
        if let Some(geometry) = request.geometry {
            polygons = polygons
                .into_iter()
                .map(|p| BoundaryPolygon {
                    exterior: p.exterior.map_points(|q| geometry.pixel_to_world(q)),
                    holes: p
                        .holes
                        .iter()
                        .map(|h| h.map_points(|q| geometry.pixel_to_world(q)))
                        .collect(),
                })
                .collect();
        }
        Ok(polygons)
    }
}

impl Vectorizer for ContourVectorizer {
    fn name(&self) -> &str {
        CONTOUR_VECTORIZER
    }

    fn vectorize(
        &self,
        request: &VectorizeRequest<'_>,
        console: &mut dyn Write,
    ) -> Result<VectorSummary, VectorizeError> {
        let polygons = self.polygons(request)?;
        let name = request.raster.file_stem().and_then(|s| s.to_str());
        let json = to_geojson(
            &polygons,
            &GeoJsonMetadata {
                name,
                level: Some(request.foreground),
            },
        );
        match request.output {
            VectorTarget::File(path) => {
                std::fs::write(path, json)?;
                info!("wrote {} polygons to <{}>", polygons.len(), path.display());
            }
            VectorTarget::Console => {
                writeln!(console, "{json}")?;
            }
        }
        Ok(VectorSummary {
            polygons: polygons.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use shoreline_pipeline::{AffineGeometry, Dimensions, IndexImage, SampleFormat};

    use super::*;
    use crate::raster::write_product;

    const SIZE: Dimensions = Dimensions {
        width: 12,
        height: 12,
    };

    /// Land everywhere except a water square at columns/rows 3..=8,
    /// with a marginal ring just outside it.
    fn write_lake(dir: &Path) -> PathBuf {
        let path = dir.join("lake.tif");
        let image = IndexImage::from_fn(SIZE.width, SIZE.height, |x, y| {
            let inside = |lo, hi| (lo..=hi).contains(&x) && (lo..=hi).contains(&y);
            image::Luma([if inside(3, 8) {
                255.0
            } else if inside(2, 9) {
                128.0
            } else {
                0.0
            }])
        });
        write_product(&path, &image, SampleFormat::U8, None).unwrap();
        path
    }

    fn request<'a>(raster: &'a Path, output: &'a VectorTarget) -> VectorizeRequest<'a> {
        VectorizeRequest {
            raster,
            output,
            mode: VectorMode::Polygon,
            foreground: 255,
            geometry: None,
            simplify_tolerance: 0.0,
        }
    }

    #[test]
    fn default_registry_has_contour() {
        let registry = VectorizerRegistry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![CONTOUR_VECTORIZER]);
        assert_eq!(registry.create("contour").unwrap().name(), "contour");
        assert!(registry.create("potrace").is_none());
        assert!(VectorizerRegistry::empty().create("contour").is_none());
    }

    #[test]
    fn console_target_prints_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let raster = write_lake(dir.path());
        let mut console = Vec::new();
        let summary = ContourVectorizer::default()
            .vectorize(&request(&raster, &VectorTarget::Console), &mut console)
            .unwrap();
        assert_eq!(summary.polygons, 1);
        let doc: serde_json::Value = serde_json::from_slice(&console).unwrap();
        assert_eq!(doc["type"], "FeatureCollection");
        assert_eq!(doc["name"], "lake");
    }

    #[test]
    fn file_target_written() {
        let dir = tempfile::tempdir().unwrap();
        let raster = write_lake(dir.path());
        let out = dir.path().join("lake.json");
        let target = VectorTarget::File(out.clone());
        let mut console = Vec::new();
        ContourVectorizer::default()
            .vectorize(&request(&raster, &target), &mut console)
            .unwrap();
        assert!(console.is_empty());
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(doc["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn simplified_square_has_four_corners() {
        let dir = tempfile::tempdir().unwrap();
        let raster = write_lake(dir.path());
        let target = VectorTarget::Console;
        let polygons = ContourVectorizer::default()
            .polygons(&VectorizeRequest {
                simplify_tolerance: 0.5,
                ..request(&raster, &target)
            })
            .unwrap();
        assert_eq!(polygons[0].exterior.len(), 5);
    }

    #[test]
    fn geometry_maps_to_world() {
        let dir = tempfile::tempdir().unwrap();
        let raster = write_lake(dir.path());
        let target = VectorTarget::Console;
        let geometry = AffineGeometry::new([1000.0, 10.0, 0.0, 2000.0, 0.0, -10.0], SIZE);
        let polygons = ContourVectorizer::default()
            .polygons(&VectorizeRequest {
                geometry: Some(&geometry),
                ..request(&raster, &target)
            })
            .unwrap();
        for p in polygons[0].exterior.points() {
            assert!((1035.0..=1085.0).contains(&p.x), "x = {}", p.x);
            assert!((1915.0..=1965.0).contains(&p.y), "y = {}", p.y);
        }
    }

    #[test]
    fn sea_running_off_the_frame_is_traced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coast.tif");
        let image = IndexImage::from_fn(SIZE.width, SIZE.height, |x, _| {
            image::Luma([if x < 5 { 255.0 } else { 0.0 }])
        });
        write_product(&path, &image, SampleFormat::U8, None).unwrap();
        let target = VectorTarget::Console;
        let polygons = ContourVectorizer::default()
            .polygons(&request(&path, &target))
            .unwrap();
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].exterior.is_closed());
    }

    #[test]
    fn missing_raster_is_an_error() {
        let target = VectorTarget::Console;
        let err = ContourVectorizer::default()
            .vectorize(
                &request(Path::new("/nonexistent/p.tif"), &target),
                &mut Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(err, VectorizeError::Raster(_)));
    }
}
