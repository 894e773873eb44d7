//! Where the raster and vector products go.
//!
//! The output path names the vector product; the raster is written next
//! to it with a `.tif` extension. Without an output path the vector goes
//! to the console and the raster gets a timestamped temporary name. In
//! edge mode there is no vector product and the output path names the
//! raster itself.
//!
//! A vector path that already ends in `.tif` would put both products in
//! one file, so the raster is renamed `<stem>_raster.tif` instead.

use std::path::{Path, PathBuf};

/// Base name for rasters written without an explicit output path.
pub const TEMP_PRODUCT_STEM: &str = "temp_shoreline";

/// Suffix added to the raster stem when the vector path is itself a TIFF.
const RASTER_STEM_SUFFIX: &str = "_raster";

/// Destination of the vector product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorTarget {
    /// Write to this file.
    File(PathBuf),
    /// Write to the console stream.
    Console,
}

/// Resolved product locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPaths {
    /// Raster product file.
    pub raster: PathBuf,
    /// Vector product destination; `None` in edge mode.
    pub vector: Option<VectorTarget>,
}

impl ProductPaths {
    /// Resolve product locations from the user's output path.
    ///
    /// `timestamp` is appended to the temporary raster name when no
    /// output path is given.
    #[must_use]
    pub fn resolve(output: Option<&Path>, edge_mode: bool, timestamp: &str) -> Self {
        let temp = || PathBuf::from(format!("{TEMP_PRODUCT_STEM}_{timestamp}.tif"));
        match (output, edge_mode) {
            (Some(path), true) => Self {
                raster: path.to_path_buf(),
                vector: None,
            },
            (None, true) => Self {
                raster: temp(),
                vector: None,
            },
            (Some(path), false) => Self {
                raster: sibling_raster(path),
                vector: Some(VectorTarget::File(path.to_path_buf())),
            },
            (None, false) => Self {
                raster: temp(),
                vector: Some(VectorTarget::Console),
            },
        }
    }
}

/// `path` with a `.tif` extension, renamed when that would be `path`
/// itself.
fn sibling_raster(path: &Path) -> PathBuf {
    let is_tif = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif"));
    if !is_tif {
        return path.with_extension("tif");
    }
    let mut stem = path.file_stem().unwrap_or_default().to_os_string();
    stem.push(RASTER_STEM_SUFFIX);
    stem.push(".tif");
    path.with_file_name(stem)
}
