//! shoreline-export: Pure format serializers (sans-IO)
//!
//! Converts traced shoreline polygons into output formats. Currently
//! supports GeoJSON.

pub mod geojson;

pub use geojson::{GeoJsonMetadata, to_geojson};
