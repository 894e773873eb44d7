//! Integration tests: full product runs over synthetic bands on disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use image::GrayImage;
use shoreline_io::{
    Configured, ContourVectorizer, ProductReport, VectorStatus, VectorSummary, VectorTarget,
    VectorizeError, VectorizeRequest, Vectorizer, load_bands,
};
use shoreline_pipeline::{
    AffineGeometry, ConfigError, PipelineError, PixelSource, ShorelineConfig, Threshold,
};

/// Counts calls instead of vectorizing.
#[derive(Default)]
struct CountingVectorizer {
    calls: Cell<usize>,
}

impl Vectorizer for CountingVectorizer {
    fn name(&self) -> &str {
        "counting"
    }

    fn vectorize(
        &self,
        _request: &VectorizeRequest<'_>,
        _console: &mut dyn Write,
    ) -> Result<VectorSummary, VectorizeError> {
        self.calls.set(self.calls.get() + 1);
        Ok(VectorSummary { polygons: 0 })
    }
}

/// Always fails after being called.
struct FailingVectorizer;

impl Vectorizer for FailingVectorizer {
    fn name(&self) -> &str {
        "failing"
    }

    fn vectorize(
        &self,
        _request: &VectorizeRequest<'_>,
        _console: &mut dyn Write,
    ) -> Result<VectorSummary, VectorizeError> {
        Err(VectorizeError::Write(std::io::Error::other("disk full")))
    }
}

/// Write green and NIR bands for a 40x30 scene: water (high green, low
/// NIR) in a rectangle at columns 10..30, rows 8..22, land elsewhere.
fn write_scene(dir: &Path) -> Arc<dyn PixelSource> {
    let water = |x: u32, y: u32| (10..30).contains(&x) && (8..22).contains(&y);
    let green = GrayImage::from_fn(40, 30, |x, y| image::Luma([if water(x, y) { 200 } else { 40 }]));
    let nir = GrayImage::from_fn(40, 30, |x, y| image::Luma([if water(x, y) { 20 } else { 160 }]));
    let green_path = dir.join("green.png");
    let nir_path = dir.join("nir.png");
    green.save(&green_path).unwrap();
    nir.save(&nir_path).unwrap();
    Arc::new(load_bands(&[green_path, nir_path]).unwrap())
}

fn configured(dir: &Path, config: &ShorelineConfig, output: &Path) -> Configured {
    let source = write_scene(dir);
    let geometry = AffineGeometry::identity(source.dimensions());
    Configured::new(config, source, geometry, Some(output), "test")
        .unwrap()
        .with_tile_size(16)
}

fn run(dir: &Path, config: &ShorelineConfig, output: &Path, vectorizer: Option<&dyn Vectorizer>) -> ProductReport {
    configured(dir, config, output)
        .produce_raster()
        .unwrap()
        .finish(vectorizer, &mut std::io::sink())
}

#[test]
fn classified_raster_and_geojson_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("coast.json");
    let report = run(
        dir.path(),
        &ShorelineConfig::default(),
        &output,
        Some(&ContourVectorizer::default()),
    );

    assert!(report.is_success());
    assert_eq!(report.raster, dir.path().join("coast.tif"));
    let raster = image::open(&report.raster).unwrap().to_luma8();
    assert_eq!(raster.dimensions(), (40, 30));
    assert_eq!(raster.get_pixel(20, 15).0[0], 255, "lake centre is water");
    assert_eq!(raster.get_pixel(2, 2).0[0], 0, "corner is land");

    match report.vector {
        VectorStatus::Written { target, polygons } => {
            assert_eq!(target, VectorTarget::File(output.clone()));
            assert_eq!(polygons, 1);
        }
        other => panic!("unexpected vector status {other:?}"),
    }
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
    assert_eq!(doc["features"].as_array().unwrap().len(), 1);
}

#[test]
fn edge_mode_never_calls_vectorizer() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("edges.tif");
    let config = ShorelineConfig {
        do_edge_detect: true,
        ..ShorelineConfig::default()
    };
    let vectorizer = CountingVectorizer::default();
    let report = run(dir.path(), &config, &output, Some(&vectorizer));

    assert_eq!(vectorizer.calls.get(), 0);
    assert!(matches!(report.vector, VectorStatus::Skipped));
    assert!(report.is_success());
    assert_eq!(report.raster, output);
    assert!(image::open(&output).is_ok());
}

#[test]
fn missing_vectorizer_keeps_raster() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("coast.json");
    let report = run(dir.path(), &ShorelineConfig::default(), &output, None);

    assert!(matches!(report.vector, VectorStatus::Unavailable));
    assert!(!report.is_success());
    assert!(!output.exists());
    let raster = image::open(&report.raster).unwrap().to_luma8();
    assert_eq!(raster.dimensions(), (40, 30));
}

#[test]
fn vectorizer_called_once_in_vector_mode() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("coast.json");
    let vectorizer = CountingVectorizer::default();
    let report = run(dir.path(), &ShorelineConfig::default(), &output, Some(&vectorizer));
    assert_eq!(vectorizer.calls.get(), 1);
    assert!(report.is_success());
}

#[test]
fn vectorizer_failure_is_final_status() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("coast.json");
    let report = run(
        dir.path(),
        &ShorelineConfig::default(),
        &output,
        Some(&FailingVectorizer),
    );
    assert!(matches!(report.vector, VectorStatus::Failed(_)));
    assert!(!report.is_success());
    assert!(report.raster.exists());
}

#[test]
fn tile_size_does_not_change_product() {
    let dir = tempfile::tempdir().unwrap();
    let config = ShorelineConfig {
        smoothing: 1.5,
        ..ShorelineConfig::default()
    };
    let small = dir.path().join("small.json");
    let whole = dir.path().join("whole.json");
    let _ = configured(dir.path(), &config, &small)
        .with_tile_size(7)
        .produce_raster()
        .unwrap();
    let _ = configured(dir.path(), &config, &whole)
        .with_tile_size(1024)
        .produce_raster()
        .unwrap();
    let a = image::open(small.with_extension("tif")).unwrap().to_luma8();
    let b = image::open(whole.with_extension("tif")).unwrap().to_luma8();
    assert_eq!(a, b);
}

#[test]
fn skipped_threshold_writes_float_index() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ndwi.json");
    let config = ShorelineConfig {
        threshold: Threshold::Skip,
        smoothing: 0.0,
        ..ShorelineConfig::default()
    };
    let produced = configured(dir.path(), &config, &output)
        .produce_raster()
        .unwrap();
    let index = shoreline_io::bands::read_tiff(produced.raster_path()).unwrap();
    let centre = index.get_pixel(20, 15).0[0];
    let corner = index.get_pixel(2, 2).0[0];
    // green / (green + nir): 200/220 over water, 40/200 over land.
    assert!((centre - 200.0 / 220.0).abs() < 1e-5, "centre = {centre}");
    assert!((corner - 0.2).abs() < 1e-5, "corner = {corner}");
}

#[test]
fn skipped_threshold_does_not_vectorize() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ndwi.json");
    let config = ShorelineConfig {
        threshold: Threshold::Skip,
        ..ShorelineConfig::default()
    };
    let vectorizer = CountingVectorizer::default();
    let report = run(dir.path(), &config, &output, Some(&vectorizer));

    assert_eq!(vectorizer.calls.get(), 0);
    assert!(matches!(
        report.vector,
        VectorStatus::Failed(VectorizeError::Unclassified { .. })
    ));
    assert!(!report.is_success());
    assert!(report.raster.exists());
    assert!(!output.exists());
}

#[test]
fn tif_output_path_keeps_raster_separate() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("coast.tif");
    let report = run(
        dir.path(),
        &ShorelineConfig::default(),
        &output,
        Some(&ContourVectorizer::default()),
    );

    assert!(report.is_success());
    assert_eq!(report.raster, dir.path().join("coast_raster.tif"));
    let raster = image::open(&report.raster).unwrap().to_luma8();
    assert_eq!(raster.get_pixel(20, 15).0[0], 255);
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
}

#[test]
fn sea_touching_the_frame_is_vectorized() {
    let dir = tempfile::tempdir().unwrap();
    let sea = |x: u32| x < 15;
    let green = GrayImage::from_fn(40, 30, |x, _| image::Luma([if sea(x) { 200 } else { 40 }]));
    let nir = GrayImage::from_fn(40, 30, |x, _| image::Luma([if sea(x) { 20 } else { 160 }]));
    let green_path = dir.path().join("green.png");
    let nir_path = dir.path().join("nir.png");
    green.save(&green_path).unwrap();
    nir.save(&nir_path).unwrap();
    let source: Arc<dyn PixelSource> = Arc::new(load_bands(&[green_path, nir_path]).unwrap());
    let geometry = AffineGeometry::identity(source.dimensions());
    let output = dir.path().join("coast.json");

    let report = Configured::new(&ShorelineConfig::default(), source, geometry, Some(&output), "t")
        .unwrap()
        .produce_raster()
        .unwrap()
        .finish(Some(&ContourVectorizer::default()), &mut std::io::sink());

    match report.vector {
        VectorStatus::Written { polygons, .. } => assert_eq!(polygons, 1),
        other => panic!("unexpected vector status {other:?}"),
    }
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["features"].as_array().unwrap().len(), 1);
}

#[test]
fn insufficient_bands_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let band = dir.path().join("only.png");
    GrayImage::new(4, 4).save(&band).unwrap();
    let source: Arc<dyn PixelSource> = Arc::new(load_bands(&[band]).unwrap());
    let geometry = AffineGeometry::identity(source.dimensions());
    let output = dir.path().join("out.json");
    let err = Configured::new(
        &ShorelineConfig::default(),
        source,
        geometry,
        Some(&output),
        "t",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        shoreline_io::ProductError::Pipeline(PipelineError::Config(ConfigError::BandCount { .. }))
    ));
    assert!(!output.with_extension("tif").exists());
}
